//! Task record and board status

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Task identifier (creation-ordered integer)
pub type TaskId = u64;

/// Board column a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "TO-DO")]
    Todo,
    #[serde(rename = "DOING")]
    Doing,
    #[serde(rename = "DONE")]
    Done,
}

impl Status {
    /// All columns in display order
    pub const ALL: [Status; 3] = [Status::Todo, Status::Doing, Status::Done];

    /// Wire/display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TO-DO",
            Self::Doing => "DOING",
            Self::Done => "DONE",
        }
    }

    /// Column position (0..3)
    pub fn index(&self) -> usize {
        match self {
            Self::Todo => 0,
            Self::Doing => 1,
            Self::Done => 2,
        }
    }

    /// Column at position, if any
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Column to the right, wrapping
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Column to the left, wrapping
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TO-DO" | "TODO" => Ok(Self::Todo),
            "DOING" => Ok(Self::Doing),
            "DONE" => Ok(Self::Done),
            other => Err(format!("Unknown status '{}'. Expected TO-DO, DOING or DONE", other)),
        }
    }
}

/// A task card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: Status,
}

impl Task {
    /// Create a new task
    pub fn new(id: TaskId, title: impl Into<String>, description: impl Into<String>, status: Status) -> Self {
        let title = title.into();
        debug!(id, %title, %status, "Task::new: called");
        Self {
            id,
            title,
            description: description.into(),
            status,
        }
    }

    /// Same task moved to another column
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Same task with new title and description
    pub fn with_text(&self, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..self.clone()
        }
    }
}

/// Split a task list into per-column views, preserving list order
///
/// Every task lands in exactly one column.
pub fn partition(tasks: &[Task]) -> [Vec<&Task>; 3] {
    debug!(count = tasks.len(), "partition: called");
    let mut columns: [Vec<&Task>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for task in tasks {
        columns[task.status.index()].push(task);
    }
    columns
}
