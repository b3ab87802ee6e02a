//! TaskStore - the single mutable task list

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::id::IdSource;
use crate::snapshot::TaskSnapshot;
use crate::storage::Storage;
use crate::task::{Status, Task, TaskId};

/// Change notification capacity; slow subscribers only miss re-render hints
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notification sent to subscribers after every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded { count: usize },
    Created { id: TaskId },
    Updated { id: TaskId },
    Deleted { id: TaskId },
}

/// Mutation surface the board works against
pub trait TaskMutator {
    fn task(&self, id: TaskId) -> Option<Task>;
    fn next_id(&mut self) -> TaskId;
    fn create(&mut self, task: Task);
    fn update(&mut self, task: Task) -> bool;
    fn delete(&mut self, id: TaskId) -> bool;
}

/// Canonical task list with write-through persistence
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn Storage>,
    ids: Box<dyn IdSource>,
    events: broadcast::Sender<StoreEvent>,
}

impl TaskStore {
    /// Empty store, nothing read yet
    pub fn new(storage: impl Storage + 'static, ids: impl IdSource + 'static) -> Self {
        debug!("TaskStore::new: called");
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tasks: Vec::new(),
            storage: Box::new(storage),
            ids: Box::new(ids),
            events,
        }
    }

    /// Create and load, degrading to an empty list on any load failure
    pub fn open(storage: impl Storage + 'static, ids: impl IdSource + 'static) -> Self {
        debug!("TaskStore::open: called");
        let mut store = Self::new(storage, ids);
        match store.load() {
            Ok(count) => info!(count, "Loaded tasks"),
            Err(e) => {
                warn!(error = %e, "Failed to load tasks, starting with an empty list");
                store.tasks.clear();
            }
        }
        store
    }

    /// Replace the in-memory list with the persisted one
    ///
    /// Absent data loads as an empty list. On error the in-memory list is
    /// left untouched.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        debug!("TaskStore::load: called");
        let tasks = match self.storage.read()? {
            Some(raw) => serde_json::from_str::<Vec<Task>>(&raw)?,
            None => Vec::new(),
        };
        for task in &tasks {
            self.ids.observe(task.id);
        }
        self.tasks = tasks;
        let count = self.tasks.len();
        self.emit(StoreEvent::Loaded { count });
        Ok(count)
    }

    /// Serialize and write the full list
    pub fn save(&self) -> Result<(), StoreError> {
        debug!(count = self.tasks.len(), "TaskStore::save: called");
        let raw = serde_json::to_string(&self.tasks)?;
        self.storage.write(&raw)
    }

    /// Generate a fresh id
    pub fn next_id(&mut self) -> TaskId {
        self.ids.next_id()
    }

    /// Build a task with a generated id
    pub fn new_task(&mut self, title: impl Into<String>, description: impl Into<String>, status: Status) -> Task {
        let id = self.next_id();
        Task::new(id, title, description, status)
    }

    /// Append a task
    pub fn create(&mut self, task: Task) {
        debug!(id = task.id, "TaskStore::create: called");
        let id = task.id;
        self.tasks.push(task);
        self.persist();
        self.emit(StoreEvent::Created { id });
    }

    /// Replace the entry with the same id; returns false (and writes nothing) if absent
    pub fn update(&mut self, task: Task) -> bool {
        debug!(id = task.id, "TaskStore::update: called");
        let id = task.id;
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(slot) => {
                *slot = task;
                self.persist();
                self.emit(StoreEvent::Updated { id });
                true
            }
            None => {
                debug!(id, "TaskStore::update: no such task, ignoring");
                false
            }
        }
    }

    /// Remove the entry with this id; returns false (and writes nothing) if absent
    pub fn delete(&mut self, id: TaskId) -> bool {
        debug!(id, "TaskStore::delete: called");
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            debug!(id, "TaskStore::delete: no such task, ignoring");
            return false;
        }
        self.persist();
        self.emit(StoreEvent::Deleted { id });
        true
    }

    /// Live list
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Immutable copy for read-only consumers
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot::new(&self.tasks)
    }

    /// Receive a [`StoreEvent`] after every change made from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        debug!("TaskStore::subscribe: new subscriber");
        self.events.subscribe()
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist tasks, keeping in-memory state");
        }
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl TaskMutator for TaskStore {
    fn task(&self, id: TaskId) -> Option<Task> {
        self.get(id).cloned()
    }

    fn next_id(&mut self) -> TaskId {
        TaskStore::next_id(self)
    }

    fn create(&mut self, task: Task) {
        TaskStore::create(self, task)
    }

    fn update(&mut self, task: Task) -> bool {
        TaskStore::update(self, task)
    }

    fn delete(&mut self, id: TaskId) -> bool {
        TaskStore::delete(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdSource;
    use crate::storage::MemoryStorage;

    fn store_with(storage: &MemoryStorage) -> TaskStore {
        TaskStore::open(storage.clone(), SequentialIdSource::default())
    }

    #[test]
    fn test_create_writes_through() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);

        let task = store.new_task("Fix bug", "in module X", Status::Doing);
        store.create(task.clone());

        assert_eq!(store.tasks(), &[task.clone()]);
        assert_eq!(storage.write_count(), 1);
        let persisted: Vec<Task> = serde_json::from_str(&storage.get().unwrap()).unwrap();
        assert_eq!(persisted, vec![task]);
    }

    #[test]
    fn test_update_replaces_matching_entry() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        let a = store.new_task("a", "a", Status::Todo);
        let b = store.new_task("b", "b", Status::Todo);
        store.create(a.clone());
        store.create(b.clone());

        assert!(store.update(b.with_status(Status::Done)));
        assert_eq!(store.tasks()[0], a);
        assert_eq!(store.tasks()[1].status, Status::Done);
        assert_eq!(storage.write_count(), 3);
    }

    #[test]
    fn test_update_missing_is_silent_noop() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create(Task::new(1, "a", "a", Status::Todo));

        assert!(!store.update(Task::new(99, "ghost", "ghost", Status::Done)));
        assert!(!store.delete(99));
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_delete_removes_entry() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create(Task::new(1, "a", "a", Status::Todo));
        store.create(Task::new(2, "b", "b", Status::Todo));

        assert!(store.delete(1));
        assert_eq!(store.tasks().iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(storage.get().unwrap().matches("\"id\"").count(), 1);
    }

    #[test]
    fn test_load_corrupted_degrades_to_empty() {
        let storage = MemoryStorage::with_value("{not json");
        let store = store_with(&storage);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_load_error_is_reported() {
        let storage = MemoryStorage::with_value("[{\"id\":1}]");
        let mut store = TaskStore::new(storage, SequentialIdSource::default());
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_load_unavailable_degrades_to_empty() {
        let storage = MemoryStorage::new();
        storage.fail_reads(true);
        let store = store_with(&storage);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        storage.fail_writes(true);

        store.create(Task::new(1, "a", "a", Status::Todo));
        assert_eq!(store.tasks().len(), 1);
        assert!(storage.get().is_none());
        assert!(store.save().is_err());
    }

    #[test]
    fn test_ids_continue_after_loaded() {
        let storage = MemoryStorage::with_value(
            r#"[{"id":41,"title":"a","description":"b","status":"DONE"}]"#,
        );
        let mut store = store_with(&storage);
        assert_eq!(store.next_id(), 42);
    }

    #[test]
    fn test_loading_max_id_does_not_panic() {
        let seeded = r#"[{"id":18446744073709551615,"title":"a","description":"b","status":"DONE"}]"#;

        let mut store = store_with(&MemoryStorage::with_value(seeded));
        let task = store.new_task("c", "d", Status::Todo);
        store.create(task);
        assert_eq!(store.tasks().len(), 2);

        let mut store = TaskStore::open(MemoryStorage::with_value(seeded), crate::id::ClockIdSource::new());
        let task = store.new_task("c", "d", Status::Todo);
        store.create(task);
        assert_eq!(store.tasks().len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create(Task::new(1, "a", "a", Status::Todo));

        let snapshot = store.snapshot();
        store.delete(1);
        assert_eq!(snapshot.len(), 1);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        let mut rx = store.subscribe();

        store.create(Task::new(1, "a", "a", Status::Todo));
        store.update(Task::new(1, "a", "a", Status::Doing));
        store.update(Task::new(5, "x", "x", Status::Doing));
        store.delete(1);

        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Created { id: 1 });
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Updated { id: 1 });
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Deleted { id: 1 });
        assert!(rx.try_recv().is_err());
    }
}
