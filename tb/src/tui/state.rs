//! TUI view state
//!
//! Only presentation state lives here: modes, input buffers, scroll and the
//! layout rectangles recorded while rendering. Tasks and the transcript
//! belong to the coordinator.

use std::time::Instant;

use rand::seq::IndexedRandom;
use ratatui::layout::Rect;
use taskstore::Status;
use tracing::debug;

/// Words for the busy indicator while a turn is in flight
pub const STREAMING_WORDS: &[&str] = &[
    "Pondering",
    "Thinking",
    "Shuffling cards",
    "Sorting",
    "Consulting the board",
    "Reasoning",
    "Musing",
];

/// Height of one rendered card, in rows
pub const CARD_HEIGHT: u16 = 3;

/// Field of a task form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Title,
    Description,
}

impl Field {
    pub fn toggle(self) -> Self {
        match self {
            Field::Title => Field::Description,
            Field::Description => Field::Title,
        }
    }
}

/// What keys currently do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Normal,
    /// Typing into a column's add form
    Adding { status: Status, field: Field },
    /// Typing into the edit form of a card
    Editing { field: Field },
    /// Typing a chat message
    ChatInput,
    Help,
}

impl InteractionMode {
    /// Keys go to a text buffer
    pub fn is_typing(&self) -> bool {
        matches!(self, Self::Adding { .. } | Self::Editing { .. } | Self::ChatInput)
    }
}

/// Presentation state for the TUI
#[derive(Debug, Default)]
pub struct AppState {
    pub interaction_mode: InteractionMode,
    pub should_quit: bool,

    /// Chat input buffer
    pub chat_input: String,
    /// Message waiting to be started by the runner
    pub pending_submit: Option<String>,
    /// Manual scroll offset for the transcript (None = follow bottom)
    pub chat_scroll: Option<usize>,
    /// Max transcript scroll, cached during render
    pub chat_max_scroll: usize,

    /// Word shown while a turn is running
    pub streaming_word: String,
    /// When the running turn started
    pub streaming_start: Option<Instant>,

    /// Transient one-line status (store changes, etc.)
    pub status_line: Option<String>,

    /// Column rectangles from the last render, for mouse hit-testing
    pub column_areas: [Rect; 3],
    /// First visible card in each column, kept during render
    pub column_scroll: [usize; 3],
}

impl AppState {
    pub fn new() -> Self {
        debug!("AppState::new: called");
        Self::default()
    }

    /// Start the busy indicator with a random word
    pub fn start_streaming(&mut self) {
        debug!("AppState::start_streaming: called");
        let mut rng = rand::rng();
        self.streaming_word = STREAMING_WORDS.choose(&mut rng).unwrap_or(&"Thinking").to_string();
        self.streaming_start = Some(Instant::now());
        self.chat_scroll = None;
    }

    pub fn stop_streaming(&mut self) {
        debug!("AppState::stop_streaming: called");
        self.streaming_start = None;
    }

    /// Column under a screen position
    pub fn column_at(&self, x: u16, y: u16) -> Option<Status> {
        self.column_areas
            .iter()
            .position(|area| area.contains((x, y).into()))
            .and_then(Status::from_index)
    }

    /// Card row under a screen position within a column (ignores the border)
    pub fn row_at(&self, status: Status, y: u16) -> Option<usize> {
        let area = self.column_areas[status.index()];
        let top = area.y + 1;
        if y < top || y >= area.y + area.height.saturating_sub(1) {
            return None;
        }
        Some(self.column_scroll[status.index()] + ((y - top) / CARD_HEIGHT) as usize)
    }

    pub fn scroll_up(&mut self) {
        let current = self.chat_scroll.unwrap_or(self.chat_max_scroll);
        self.chat_scroll = Some(current.saturating_sub(1));
    }

    pub fn scroll_down(&mut self) {
        let next = self.chat_scroll.unwrap_or(self.chat_max_scroll) + 1;
        self.chat_scroll = if next >= self.chat_max_scroll { None } else { Some(next) };
    }
}
