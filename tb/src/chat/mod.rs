//! Conversation controller
//!
//! A turn goes `Idle -> Sending -> (AwaitingToolResult -> SendingFollowup)? -> Idle`,
//! or ends in `Failed` from any sending phase. The task list is only ever
//! seen here as a [`taskstore::TaskSnapshot`].

mod conversation;
mod engine;
pub mod tools;

pub use conversation::Conversation;
pub use engine::ChatEngine;

use crate::llm::{ChatMessage, TokenUsage};

/// Closing message when the model produced nothing usable
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't generate a response.";

/// Closing message when a turn failed
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again or check the logs for details.";

/// Where the current turn is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Idle,
    Sending,
    AwaitingToolResult,
    SendingFollowup,
    Failed,
}

impl ChatPhase {
    /// A request is in flight; input is disabled
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Sending | Self::AwaitingToolResult | Self::SendingFollowup)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::AwaitingToolResult => "reading tasks",
            Self::SendingFollowup => "sending follow-up",
            Self::Failed => "error",
        }
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Reply { message: ChatMessage, usage: TokenUsage },
    Failed { error: String, usage: TokenUsage },
}

impl TurnOutcome {
    pub fn usage(&self) -> TokenUsage {
        match self {
            Self::Reply { usage, .. } | Self::Failed { usage, .. } => *usage,
        }
    }
}

/// Progress of a turn running in the background
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    Phase(ChatPhase),
    Done(TurnOutcome),
}
