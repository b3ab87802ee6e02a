//! TUI application - key and mouse handling
//!
//! The App owns the view state and the coordinator. It never renders;
//! that is the views module's job. Chat turns are not started here, only
//! queued in `pending_submit` for the runner.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use taskstore::{Status, partition};
use tracing::{debug, trace};

use super::state::{AppState, Field, InteractionMode};
use crate::board::Draft;
use crate::coordinator::{Coordinator, Tab};

/// TUI application
pub struct App {
    state: AppState,
    coordinator: Coordinator,
}

impl App {
    pub fn new(coordinator: Coordinator) -> Self {
        debug!("App::new: called");
        Self {
            state: AppState::new(),
            coordinator,
        }
    }

    pub fn state(&self) -> &AppState {
        trace!("App::state: called");
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        trace!("App::state_mut: called");
        &mut self.state
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    /// Both halves at once, for rendering
    pub fn parts_mut(&mut self) -> (&mut AppState, &Coordinator) {
        (&mut self.state, &self.coordinator)
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_key: called");
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            debug!("App::handle_key: Ctrl+C force quit");
            return true;
        }
        self.state.status_line = None;

        match self.state.interaction_mode {
            InteractionMode::Normal => match self.coordinator.tab() {
                Tab::Chat => self.handle_chat_key(key),
                Tab::Tasks => self.handle_board_key(key),
            },
            InteractionMode::Adding { status, field } => self.handle_adding_key(key, status, field),
            InteractionMode::Editing { field } => self.handle_editing_key(key, field),
            InteractionMode::ChatInput => self.handle_chat_input_key(key),
            InteractionMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.state.interaction_mode = InteractionMode::Normal;
                }
            }
        }
        false
    }

    /// Keys shared by both tabs; returns true if consumed
    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => {
                debug!("App::handle_global_key: quit requested");
                self.state.should_quit = true;
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.state.interaction_mode = InteractionMode::Help;
            }
            KeyCode::Tab => {
                self.coordinator.toggle_tab();
            }
            _ => return false,
        }
        true
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        debug!(?key, "App::handle_chat_key: called");
        if self.handle_global_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char('i') | KeyCode::Enter => {
                self.state.interaction_mode = InteractionMode::ChatInput;
            }
            KeyCode::Char('c') => {
                self.coordinator.chat.clear();
                self.state.chat_scroll = None;
            }
            KeyCode::Char('x') => self.coordinator.chat.dismiss_error(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            _ => {}
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        debug!(?key, "App::handle_board_key: called");
        if self.handle_global_key(key) {
            return;
        }
        let Coordinator { store, board, .. } = &mut self.coordinator;
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => board.focus_prev(),
            KeyCode::Char('l') | KeyCode::Right => board.focus_next(),
            KeyCode::Char('j') | KeyCode::Down => board.select_next(store.tasks()),
            KeyCode::Char('k') | KeyCode::Up => board.select_prev(),
            KeyCode::Char('a') => {
                let status = board.focus();
                board.start_adding(status);
                self.state.interaction_mode = InteractionMode::Adding {
                    status,
                    field: Field::Title,
                };
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = board.selected_task(store.tasks()).cloned() {
                    board.start_edit(&task);
                    self.state.interaction_mode = InteractionMode::Editing { field: Field::Title };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = board.selected_task(store.tasks()).map(|t| t.id) {
                    board.delete(id, store);
                    board.clamp(store.tasks());
                }
            }
            KeyCode::Char('m') | KeyCode::Char(' ') => {
                if board.dragged().is_some() {
                    let target = board.focus();
                    board.drop_on(target, store);
                    board.clamp(store.tasks());
                } else if let Some(task) = board.selected_task(store.tasks()).cloned() {
                    board.drag_start(&task);
                }
            }
            KeyCode::Esc => board.drag_end(),
            _ => {}
        }
    }

    fn handle_adding_key(&mut self, key: KeyEvent, status: Status, field: Field) {
        debug!(?key, %status, ?field, "App::handle_adding_key: called");
        let Coordinator { store, board, .. } = &mut self.coordinator;
        match key.code {
            KeyCode::Esc => {
                board.cancel_adding(status);
                self.state.interaction_mode = InteractionMode::Normal;
            }
            // Park the form; the draft survives until the column is reopened
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.state.interaction_mode = InteractionMode::Adding {
                    status,
                    field: field.toggle(),
                };
            }
            KeyCode::Enter => {
                if board.save_new(status, store).is_some() {
                    self.state.interaction_mode = InteractionMode::Normal;
                } else {
                    self.state.status_line = Some("Title and description are both required".to_string());
                }
            }
            _ => edit_field(board.draft_mut(status), field, key),
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent, field: Field) {
        debug!(?key, ?field, "App::handle_editing_key: called");
        let Coordinator { store, board, .. } = &mut self.coordinator;
        match key.code {
            KeyCode::Esc => {
                board.cancel_edit();
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.state.interaction_mode = InteractionMode::Editing { field: field.toggle() };
            }
            KeyCode::Enter => {
                board.save_edit(store);
                self.state.interaction_mode = InteractionMode::Normal;
            }
            _ => match board.edit_draft_mut() {
                Some(draft) => edit_field(draft, field, key),
                None => self.state.interaction_mode = InteractionMode::Normal,
            },
        }
    }

    fn handle_chat_input_key(&mut self, key: KeyEvent) {
        debug!(?key, "App::handle_chat_input_key: called");
        match key.code {
            KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Enter => {
                if self.coordinator.chat.is_busy() {
                    debug!("App::handle_chat_input_key: turn in flight, input disabled");
                    return;
                }
                if self.state.chat_input.trim().is_empty() {
                    return;
                }
                self.state.pending_submit = Some(std::mem::take(&mut self.state.chat_input));
            }
            KeyCode::Backspace => {
                self.state.chat_input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.chat_input.push(c);
            }
            _ => {}
        }
    }

    /// Handle a mouse event (drag and drop on the board, scroll in chat)
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        trace!(?mouse, "App::handle_mouse: called");
        match (self.coordinator.tab(), mouse.kind) {
            (Tab::Tasks, MouseEventKind::Down(MouseButton::Left)) => {
                if self.state.interaction_mode != InteractionMode::Normal {
                    return;
                }
                let Some(status) = self.state.column_at(mouse.column, mouse.row) else {
                    return;
                };
                let Coordinator { store, board, .. } = &mut self.coordinator;
                board.set_focus(status);
                let Some(row) = self.state.row_at(status, mouse.row) else {
                    return;
                };
                let columns = partition(store.tasks());
                if let Some(task) = columns[status.index()].get(row) {
                    board.select(status, row);
                    board.drag_start(task);
                }
            }
            (Tab::Tasks, MouseEventKind::Up(MouseButton::Left)) => {
                let Coordinator { store, board, .. } = &mut self.coordinator;
                if board.dragged().is_none() {
                    return;
                }
                match self.state.column_at(mouse.column, mouse.row) {
                    Some(target) => {
                        board.drop_on(target, store);
                        board.clamp(store.tasks());
                    }
                    None => board.drag_end(),
                }
            }
            (Tab::Chat, MouseEventKind::ScrollUp) => self.state.scroll_up(),
            (Tab::Chat, MouseEventKind::ScrollDown) => self.state.scroll_down(),
            _ => {}
        }
    }
}

/// Apply a typing key to one field of a draft
fn edit_field(draft: &mut Draft, field: Field, key: KeyEvent) {
    let text = match field {
        Field::Title => &mut draft.title,
        Field::Description => &mut draft.description,
    };
    match key.code {
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => text.push(c),
        _ => {}
    }
}
