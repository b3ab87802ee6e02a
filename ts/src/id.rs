//! Task id generation
//!
//! Ids are injected into the store through [`IdSource`] so tests can use a
//! deterministic counter while the application uses the clock.

use tracing::debug;

use crate::task::TaskId;

/// Source of new task ids
pub trait IdSource: Send {
    /// Produce the next id. Must never repeat a previously returned id.
    fn next_id(&mut self) -> TaskId;

    /// Make sure future ids sort after `id` (called after loading persisted tasks)
    fn observe(&mut self, id: TaskId);
}

/// Millisecond timestamps, bumped so rapid creation never collides
#[derive(Debug, Default)]
pub struct ClockIdSource {
    last: TaskId,
}

impl ClockIdSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for ClockIdSource {
    fn next_id(&mut self) -> TaskId {
        let now = chrono::Utc::now().timestamp_millis().max(0) as TaskId;
        let id = now.max(self.last.saturating_add(1));
        debug!(now, id, "ClockIdSource::next_id: called");
        self.last = id;
        id
    }

    fn observe(&mut self, id: TaskId) {
        self.last = self.last.max(id);
    }
}

/// Plain counter starting at a fixed value
#[derive(Debug)]
pub struct SequentialIdSource {
    next: TaskId,
}

impl SequentialIdSource {
    pub fn starting_at(first: TaskId) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIdSource {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&mut self) -> TaskId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    fn observe(&mut self, id: TaskId) {
        self.next = self.next.max(id.saturating_add(1));
    }
}
