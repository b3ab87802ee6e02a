//! TaskBoard - a three-column task board with a chat assistant
//!
//! The board edits tasks in a [`taskstore::TaskStore`]; the assistant answers
//! questions about them through a single `get_tasks` tool, seeing only
//! read-only snapshots.

pub mod board;
pub mod chat;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod llm;
pub mod tui;

pub use board::BoardController;
pub use chat::{ChatEngine, Conversation};
pub use config::Config;
pub use coordinator::{Coordinator, Tab};
