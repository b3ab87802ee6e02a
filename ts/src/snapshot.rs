//! Read-only task list snapshot

use std::ops::Deref;
use std::sync::Arc;

use crate::task::Task;

/// Immutable copy of the task list, cheap to clone and send across tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSnapshot(Arc<[Task]>);

impl TaskSnapshot {
    pub fn new(tasks: &[Task]) -> Self {
        Self(Arc::from(tasks))
    }
}

impl Deref for TaskSnapshot {
    type Target = [Task];

    fn deref(&self) -> &[Task] {
        &self.0
    }
}

impl From<Vec<Task>> for TaskSnapshot {
    fn from(tasks: Vec<Task>) -> Self {
        Self(Arc::from(tasks))
    }
}
