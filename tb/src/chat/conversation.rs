//! Transcript, error banner and phase for one chat session

use taskstore::TaskSnapshot;
use tracing::{debug, info, warn};

use super::{ChatEngine, ChatPhase, ERROR_REPLY, TurnOutcome};
use crate::llm::{ChatMessage, TokenUsage};

/// Chat session state
///
/// Only user messages and turn-closing assistant messages are kept; the
/// tool-call exchange lives only in the follow-up request.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    error: Option<String>,
    phase: ChatPhase,
    usage: TokenUsage,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Tokens used this session
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Start a turn: append the user message and return the history to send
    ///
    /// Returns `None` for blank input or while another turn is in flight.
    pub fn begin(&mut self, input: &str) -> Option<Vec<ChatMessage>> {
        debug!(input_len = input.len(), phase = ?self.phase, "Conversation::begin: called");
        if input.trim().is_empty() {
            debug!("Conversation::begin: blank input, ignoring");
            return None;
        }
        if self.is_busy() {
            debug!("Conversation::begin: turn in flight, ignoring");
            return None;
        }

        self.error = None;
        self.messages.push(ChatMessage::user(input));
        self.phase = ChatPhase::Sending;
        Some(self.messages.clone())
    }

    /// Progress reported by a running turn
    pub fn set_phase(&mut self, phase: ChatPhase) {
        if self.is_busy() && phase.is_busy() {
            debug!(?phase, "Conversation::set_phase: called");
            self.phase = phase;
        }
    }

    /// Close the turn with its outcome
    pub fn finish(&mut self, outcome: TurnOutcome) {
        debug!("Conversation::finish: called");
        self.usage += outcome.usage();
        match outcome {
            TurnOutcome::Reply { message, .. } => {
                info!(reply_len = message.content.len(), "Turn finished");
                self.messages.push(message);
                self.phase = ChatPhase::Idle;
            }
            TurnOutcome::Failed { error, .. } => {
                warn!(%error, "Turn failed");
                self.error = Some(error);
                self.messages.push(ChatMessage::assistant(ERROR_REPLY));
                self.phase = ChatPhase::Failed;
            }
        }
    }

    /// Drop transcript and error; a turn in flight still completes
    pub fn clear(&mut self) {
        debug!(message_count = self.messages.len(), "Conversation::clear: called");
        self.messages.clear();
        self.error = None;
    }

    /// Hide the error banner
    pub fn dismiss_error(&mut self) {
        debug!("Conversation::dismiss_error: called");
        self.error = None;
    }

    /// Run a whole turn in place. Returns false if the input was not accepted.
    pub async fn submit(&mut self, engine: &ChatEngine, input: &str, snapshot: TaskSnapshot) -> bool {
        debug!("Conversation::submit: called");
        let Some(history) = self.begin(input) else {
            return false;
        };
        let outcome = engine.run_turn(history, snapshot, None).await;
        self.finish(outcome);
        true
    }
}
