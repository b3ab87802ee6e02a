//! TaskStore - the canonical task list with write-through persistence
//!
//! Owns the single mutable copy of the task list. Every mutation is written
//! through to durable storage as one JSON array under the `tasks` key.
//!
//! # Architecture
//!
//! ```text
//! <data-dir>/
//! └── tasks.json      # [{"id":..,"title":..,"description":..,"status":"TO-DO"}, ...]
//! ```
//!
//! Persistence failures never reach the caller of a mutation: the in-memory
//! list stays authoritative for the session and the failure is logged.
//!
//! # Example
//!
//! ```ignore
//! use taskstore::{ClockIdSource, FileStorage, Status, TaskStore};
//!
//! let mut store = TaskStore::open(FileStorage::new(data_dir), ClockIdSource::new());
//! let task = store.new_task("Fix bug", "in module X", Status::Doing);
//! store.create(task);
//! let snapshot = store.snapshot();
//! ```

mod error;
mod id;
mod snapshot;
mod storage;
mod store;
mod task;

pub use error::StoreError;
pub use id::{ClockIdSource, IdSource, SequentialIdSource};
pub use snapshot::TaskSnapshot;
pub use storage::{FileStorage, MemoryStorage, Storage, TASKS_KEY};
pub use store::{StoreEvent, TaskMutator, TaskStore};
pub use task::{Status, Task, TaskId, partition};
