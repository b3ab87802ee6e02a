//! Coordinator - owns the task store and wires it into both views

use taskstore::{StoreEvent, TaskSnapshot, TaskStore};
use tokio::sync::broadcast;
use tracing::debug;

use crate::board::BoardController;
use crate::chat::{ChatEngine, Conversation, TurnOutcome};

/// Which view is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chat,
    Tasks,
}

impl Tab {
    pub fn toggle(self) -> Self {
        match self {
            Tab::Chat => Tab::Tasks,
            Tab::Tasks => Tab::Chat,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Tasks => "Tasks",
        }
    }
}

/// Root of the application state
///
/// The store is the single mutable task list. The board gets it as a
/// mutator, the conversation only ever sees snapshots.
pub struct Coordinator {
    pub store: TaskStore,
    pub board: BoardController,
    pub chat: Conversation,
    engine: Option<ChatEngine>,
    engine_error: Option<String>,
    tab: Tab,
}

impl Coordinator {
    pub fn new(store: TaskStore, engine: Result<ChatEngine, String>) -> Self {
        debug!(task_count = store.tasks().len(), "Coordinator::new: called");
        let (engine, engine_error) = match engine {
            Ok(engine) => (Some(engine), None),
            Err(error) => (None, Some(error)),
        };
        Self {
            store,
            board: BoardController::new(),
            chat: Conversation::new(),
            engine,
            engine_error,
            tab: Tab::default(),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        debug!(?tab, "Coordinator::set_tab: called");
        self.tab = tab;
    }

    pub fn toggle_tab(&mut self) {
        self.set_tab(self.tab.toggle());
    }

    /// Read-only copy of the tasks for the conversation side
    pub fn snapshot(&self) -> TaskSnapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    /// Engine for running turns, or why there is none
    pub fn engine(&self) -> Result<&ChatEngine, &str> {
        match (&self.engine, &self.engine_error) {
            (Some(engine), _) => Ok(engine),
            (None, Some(error)) => Err(error.as_str()),
            (None, None) => Err("No LLM client configured"),
        }
    }

    /// Model name for the header
    pub fn model(&self) -> Option<&str> {
        self.engine.as_ref().map(|e| e.model())
    }

    /// Run a whole chat turn in place (one-shot use)
    pub async fn ask(&mut self, question: &str) -> bool {
        debug!("Coordinator::ask: called");
        let snapshot = self.snapshot();
        match self.engine.clone() {
            Some(engine) => self.chat.submit(&engine, question, snapshot).await,
            None => {
                let error = self.engine().err().unwrap_or_default().to_string();
                self.fail_turn(question, error)
            }
        }
    }

    /// Close a turn that could not start because there is no client
    pub fn fail_turn(&mut self, input: &str, error: String) -> bool {
        if self.chat.begin(input).is_none() {
            return false;
        }
        self.chat.finish(TurnOutcome::Failed {
            error,
            usage: Default::default(),
        });
        true
    }
}
