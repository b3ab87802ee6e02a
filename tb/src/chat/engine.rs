//! Two-round completion loop with one optional tool invocation

use std::sync::Arc;

use taskstore::TaskSnapshot;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::tools::{self, GET_TASKS};
use super::{ChatPhase, FALLBACK_REPLY, TurnEvent, TurnOutcome};
use crate::llm::{ChatMessage, CompletionRequest, CompletionResponse, LlmClient, ToolDefinition, TokenUsage};

/// Runs conversation turns against a completion client
#[derive(Clone)]
pub struct ChatEngine {
    client: Arc<dyn LlmClient>,
    tools: Vec<ToolDefinition>,
}

impl ChatEngine {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        debug!(model = client.model(), "ChatEngine::new: called");
        Self {
            client,
            tools: vec![tools::get_tasks_definition()],
        }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Run one turn for `history` (which already ends with the user message)
    ///
    /// Phase changes are reported on `events` when given. The returned
    /// outcome carries the message that closes the turn.
    pub async fn run_turn(
        &self,
        history: Vec<ChatMessage>,
        snapshot: TaskSnapshot,
        events: Option<&mpsc::UnboundedSender<TurnEvent>>,
    ) -> TurnOutcome {
        debug!(history_len = history.len(), task_count = snapshot.len(), "ChatEngine::run_turn: called");
        let report = |phase: ChatPhase| {
            if let Some(tx) = events {
                let _ = tx.send(TurnEvent::Phase(phase));
            }
        };
        let mut usage = TokenUsage::default();

        report(ChatPhase::Sending);
        let first = match self.complete(history.clone()).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "ChatEngine::run_turn: initial request failed");
                return TurnOutcome::Failed { error, usage };
            }
        };
        usage += first.usage;

        // Only the first invocation is honored
        let Some(call) = first.tool_calls.first().cloned() else {
            debug!("ChatEngine::run_turn: no tool call");
            return TurnOutcome::Reply {
                message: reply_or_fallback(first.content),
                usage,
            };
        };

        if first.tool_calls.len() > 1 {
            debug!(ignored = first.tool_calls.len() - 1, "ChatEngine::run_turn: extra tool calls ignored");
        }

        report(ChatPhase::AwaitingToolResult);
        let Some(result) = tools::resolve(&call, &snapshot) else {
            warn!(name = %call.name, "ChatEngine::run_turn: model requested unknown tool");
            return TurnOutcome::Reply {
                message: ChatMessage::assistant(FALLBACK_REPLY),
                usage,
            };
        };
        info!(tool = GET_TASKS, task_count = snapshot.len(), "Answering tool call");

        let mut followup = history;
        followup.push(ChatMessage::assistant_tool_calls(first.content, vec![call.clone()]));
        followup.push(ChatMessage::tool_result(call.id, GET_TASKS, result));

        report(ChatPhase::SendingFollowup);
        let second = match self.complete(followup).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "ChatEngine::run_turn: follow-up request failed");
                return TurnOutcome::Failed { error, usage };
            }
        };
        usage += second.usage;

        TurnOutcome::Reply {
            message: reply_or_fallback(second.content),
            usage,
        }
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<CompletionResponse, String> {
        let request = CompletionRequest {
            messages,
            tools: self.tools.clone(),
        };
        self.client.complete(request).await.map_err(|e| e.to_string())
    }
}

fn reply_or_fallback(content: Option<String>) -> ChatMessage {
    match content {
        Some(text) if !text.trim().is_empty() => ChatMessage::assistant(text),
        _ => {
            warn!("Received empty response from API");
            ChatMessage::assistant(FALLBACK_REPLY)
        }
    }
}
