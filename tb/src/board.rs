//! Board controller: cursor, inline add/edit forms and drag-and-drop
//!
//! Holds only transient UI state. All task changes go through a
//! [`TaskMutator`], so the board never owns task data.

use taskstore::{Status, Task, TaskId, TaskMutator, partition};
use tracing::{debug, info};

/// Title/description being typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

impl Draft {
    /// Both fields have non-whitespace content
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// Per-column add form (`idle` when `adding` is false)
#[derive(Debug, Clone, Default)]
pub struct ColumnState {
    pub adding: bool,
    pub draft: Draft,
}

/// Card currently in `editing`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub id: TaskId,
    pub draft: Draft,
}

/// Transient state for the three-column board
#[derive(Debug, Default)]
pub struct BoardController {
    columns: [ColumnState; 3],
    editing: Option<EditDraft>,
    dragged: Option<Task>,
    focus: usize,
    selected: [usize; 3],
}

impl BoardController {
    pub fn new() -> Self {
        Self::default()
    }

    // === Add forms ===

    pub fn column(&self, status: Status) -> &ColumnState {
        &self.columns[status.index()]
    }

    /// Draft of the column's add form, for typing into
    pub fn draft_mut(&mut self, status: Status) -> &mut Draft {
        &mut self.columns[status.index()].draft
    }

    /// Open (or resume) the add form of a column
    pub fn start_adding(&mut self, status: Status) {
        debug!(%status, "BoardController::start_adding: called");
        self.columns[status.index()].adding = true;
    }

    /// Close the add form and discard its draft
    pub fn cancel_adding(&mut self, status: Status) {
        debug!(%status, "BoardController::cancel_adding: called");
        self.columns[status.index()] = ColumnState::default();
    }

    /// Create a task from the column's draft
    ///
    /// Incomplete drafts are rejected silently and the form stays open.
    pub fn save_new(&mut self, status: Status, store: &mut impl TaskMutator) -> Option<TaskId> {
        debug!(%status, "BoardController::save_new: called");
        let column = &self.columns[status.index()];
        if !column.adding || !column.draft.is_complete() {
            debug!("BoardController::save_new: incomplete draft, ignoring");
            return None;
        }

        let draft = column.draft.clone();
        let id = store.next_id();
        store.create(Task::new(id, draft.title, draft.description, status));
        info!(id, %status, "Task created");
        self.cancel_adding(status);
        Some(id)
    }

    // === Edit form ===

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut Draft> {
        self.editing.as_mut().map(|e| &mut e.draft)
    }

    /// Enter `editing` for a card, prefilled from its current text
    pub fn start_edit(&mut self, task: &Task) {
        debug!(id = task.id, "BoardController::start_edit: called");
        self.editing = Some(EditDraft {
            id: task.id,
            draft: Draft {
                title: task.title.clone(),
                description: task.description.clone(),
            },
        });
    }

    /// Write the edited text back and return to `viewing`
    pub fn save_edit(&mut self, store: &mut impl TaskMutator) -> bool {
        debug!("BoardController::save_edit: called");
        let Some(edit) = self.editing.take() else {
            return false;
        };
        let Some(current) = store.task(edit.id) else {
            debug!(id = edit.id, "BoardController::save_edit: task vanished, closing form");
            return false;
        };
        let updated = store.update(current.with_text(edit.draft.title, edit.draft.description));
        if updated {
            info!(id = edit.id, "Task edited");
        }
        updated
    }

    /// Return to `viewing` without changing anything
    pub fn cancel_edit(&mut self) {
        debug!("BoardController::cancel_edit: called");
        self.editing = None;
    }

    // === Drag and drop ===

    pub fn dragged(&self) -> Option<&Task> {
        self.dragged.as_ref()
    }

    /// Capture the card being dragged
    pub fn drag_start(&mut self, task: &Task) {
        debug!(id = task.id, "BoardController::drag_start: called");
        self.dragged = Some(task.clone());
    }

    /// Drop the dragged card on a column
    ///
    /// Moves it only if the column differs from its status. Drag state is
    /// cleared either way.
    pub fn drop_on(&mut self, target: Status, store: &mut impl TaskMutator) -> bool {
        debug!(%target, "BoardController::drop_on: called");
        let Some(task) = self.dragged.take() else {
            return false;
        };
        if task.status == target {
            debug!(id = task.id, "BoardController::drop_on: same column, no-op");
            return false;
        }

        let id = task.id;
        let moved = store.update(task.with_status(target));
        if moved {
            info!(id, from = %task.status, to = %target, "Task moved");
            self.focus = target.index();
        }
        moved
    }

    /// Drag ended without a drop
    pub fn drag_end(&mut self) {
        debug!("BoardController::drag_end: called");
        self.dragged = None;
    }

    // === Delete ===

    pub fn delete(&mut self, id: TaskId, store: &mut impl TaskMutator) -> bool {
        debug!(id, "BoardController::delete: called");
        if self.editing.as_ref().is_some_and(|e| e.id == id) {
            self.editing = None;
        }
        if self.dragged.as_ref().is_some_and(|t| t.id == id) {
            self.dragged = None;
        }
        let deleted = store.delete(id);
        if deleted {
            info!(id, "Task deleted");
        }
        deleted
    }

    // === Cursor ===

    pub fn focus(&self) -> Status {
        Status::from_index(self.focus).unwrap_or(Status::Todo)
    }

    pub fn set_focus(&mut self, status: Status) {
        self.focus = status.index();
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus().next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus().prev());
    }

    /// Selected row in a column
    pub fn selected_row(&self, status: Status) -> usize {
        self.selected[status.index()]
    }

    pub fn select(&mut self, status: Status, row: usize) {
        self.selected[status.index()] = row;
    }

    pub fn select_next(&mut self, tasks: &[Task]) {
        let len = partition(tasks)[self.focus].len();
        if len > 0 {
            self.selected[self.focus] = (self.selected[self.focus] + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected[self.focus] = self.selected[self.focus].saturating_sub(1);
    }

    /// Card under the cursor
    pub fn selected_task<'a>(&self, tasks: &'a [Task]) -> Option<&'a Task> {
        let columns = partition(tasks);
        columns[self.focus].get(self.selected[self.focus]).copied()
    }

    /// Keep every row index inside its column after the list changed
    pub fn clamp(&mut self, tasks: &[Task]) {
        let columns = partition(tasks);
        for (row, column) in self.selected.iter_mut().zip(columns.iter()) {
            *row = (*row).min(column.len().saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records calls instead of storing anything durable
    #[derive(Default)]
    struct RecordingStore {
        tasks: Vec<Task>,
        next: TaskId,
        calls: Vec<String>,
    }

    impl RecordingStore {
        fn with(tasks: Vec<Task>) -> Self {
            Self {
                next: 100,
                tasks,
                calls: Vec::new(),
            }
        }
    }

    impl TaskMutator for RecordingStore {
        fn task(&self, id: TaskId) -> Option<Task> {
            self.tasks.iter().find(|t| t.id == id).cloned()
        }

        fn next_id(&mut self) -> TaskId {
            self.next += 1;
            self.next
        }

        fn create(&mut self, task: Task) {
            self.calls.push(format!("create {}", task.id));
            self.tasks.push(task);
        }

        fn update(&mut self, task: Task) -> bool {
            self.calls.push(format!("update {}", task.id));
            match self.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(slot) => {
                    *slot = task;
                    true
                }
                None => false,
            }
        }

        fn delete(&mut self, id: TaskId) -> bool {
            self.calls.push(format!("delete {}", id));
            let before = self.tasks.len();
            self.tasks.retain(|t| t.id != id);
            self.tasks.len() != before
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            Task::new(1, "Fix bug", "in module X", Status::Todo),
            Task::new(2, "Review", "PR 12", Status::Doing),
            Task::new(3, "Plan", "sprint", Status::Todo),
        ]
    }

    #[test]
    fn test_save_new_requires_both_fields() {
        let mut store = RecordingStore::default();
        let mut board = BoardController::new();

        board.start_adding(Status::Doing);
        board.draft_mut(Status::Doing).title = "Title".to_string();
        board.draft_mut(Status::Doing).description = "   ".to_string();
        assert!(board.save_new(Status::Doing, &mut store).is_none());
        assert!(store.calls.is_empty());
        assert!(board.column(Status::Doing).adding);

        board.draft_mut(Status::Doing).description = "Body".to_string();
        let id = board.save_new(Status::Doing, &mut store).unwrap();
        assert_eq!(store.tasks[0].id, id);
        assert_eq!(store.tasks[0].status, Status::Doing);
        assert!(!board.column(Status::Doing).adding);
        assert_eq!(board.column(Status::Doing).draft, Draft::default());
    }

    #[test]
    fn test_save_new_requires_open_form() {
        let mut store = RecordingStore::default();
        let mut board = BoardController::new();
        board.draft_mut(Status::Todo).title = "t".to_string();
        board.draft_mut(Status::Todo).description = "d".to_string();
        assert!(board.save_new(Status::Todo, &mut store).is_none());
    }

    #[test]
    fn test_column_drafts_are_independent() {
        let mut board = BoardController::new();
        board.start_adding(Status::Todo);
        board.draft_mut(Status::Todo).title = "todo draft".to_string();
        board.start_adding(Status::Done);
        board.draft_mut(Status::Done).title = "done draft".to_string();

        board.cancel_adding(Status::Done);
        assert_eq!(board.column(Status::Todo).draft.title, "todo draft");
        assert!(board.column(Status::Todo).adding);

        // Re-opening resumes the parked draft
        board.start_adding(Status::Todo);
        assert_eq!(board.column(Status::Todo).draft.title, "todo draft");
    }

    #[test]
    fn test_drop_on_same_column_is_noop() {
        let mut store = RecordingStore::with(sample());
        let mut board = BoardController::new();

        board.drag_start(&store.tasks[0].clone());
        assert!(!board.drop_on(Status::Todo, &mut store));
        assert!(store.calls.is_empty());
        assert!(board.dragged().is_none());
    }

    #[test]
    fn test_drop_preserves_fields() {
        let mut store = RecordingStore::with(sample());
        let mut board = BoardController::new();

        board.drag_start(&store.tasks[0].clone());
        assert!(board.drop_on(Status::Done, &mut store));
        assert_eq!(store.calls, vec!["update 1"]);
        assert_eq!(store.tasks[0], Task::new(1, "Fix bug", "in module X", Status::Done));
        assert!(board.dragged().is_none());
        assert_eq!(board.focus(), Status::Done);
    }

    #[test]
    fn test_drop_without_drag_is_noop() {
        let mut store = RecordingStore::with(sample());
        let mut board = BoardController::new();
        assert!(!board.drop_on(Status::Done, &mut store));
        assert!(store.calls.is_empty());
    }

    #[test]
    fn test_drag_end_clears() {
        let mut board = BoardController::new();
        board.drag_start(&sample()[1]);
        board.drag_end();
        assert!(board.dragged().is_none());
    }

    #[test]
    fn test_edit_save_and_cancel() {
        let mut store = RecordingStore::with(sample());
        let mut board = BoardController::new();

        board.start_edit(&store.tasks[1].clone());
        board.edit_draft_mut().unwrap().title = "Review again".to_string();
        board.cancel_edit();
        assert!(store.calls.is_empty());
        assert_eq!(store.tasks[1].title, "Review");

        board.start_edit(&store.tasks[1].clone());
        board.edit_draft_mut().unwrap().title = "Review again".to_string();
        assert!(board.save_edit(&mut store));
        assert_eq!(store.tasks[1].title, "Review again");
        assert_eq!(store.tasks[1].description, "PR 12");
        assert!(board.editing().is_none());
    }

    #[test]
    fn test_edit_keeps_live_status() {
        let mut store = RecordingStore::with(sample());
        let mut board = BoardController::new();

        board.start_edit(&store.tasks[0].clone());
        board.drag_start(&store.tasks[0].clone());
        board.drop_on(Status::Doing, &mut store);

        board.save_edit(&mut store);
        assert_eq!(store.tasks[0].status, Status::Doing);
    }

    #[test]
    fn test_delete_closes_edit_form() {
        let mut store = RecordingStore::with(sample());
        let mut board = BoardController::new();

        board.start_edit(&store.tasks[0].clone());
        assert!(board.delete(1, &mut store));
        assert!(board.editing().is_none());
        assert!(!board.save_edit(&mut store));
        assert_eq!(store.calls, vec!["delete 1"]);
    }

    #[test]
    fn test_cursor_navigation() {
        let tasks = sample();
        let mut board = BoardController::new();

        assert_eq!(board.selected_task(&tasks).map(|t| t.id), Some(1));
        board.select_next(&tasks);
        assert_eq!(board.selected_task(&tasks).map(|t| t.id), Some(3));
        board.select_next(&tasks);
        assert_eq!(board.selected_row(Status::Todo), 1);

        board.focus_next();
        assert_eq!(board.focus(), Status::Doing);
        assert_eq!(board.selected_task(&tasks).map(|t| t.id), Some(2));

        board.focus_next();
        assert!(board.selected_task(&tasks).is_none());
        board.focus_prev();
        board.focus_prev();
        board.select_prev();
        assert_eq!(board.selected_row(Status::Todo), 0);
    }

    #[test]
    fn test_clamp_after_delete() {
        let mut tasks = sample();
        let mut board = BoardController::new();
        board.select(Status::Todo, 1);
        tasks.retain(|t| t.id != 3);
        board.clamp(&tasks);
        assert_eq!(board.selected_row(Status::Todo), 0);
    }
}
