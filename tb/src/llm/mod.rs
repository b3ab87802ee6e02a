//! LLM client module for TaskBoard
//!
//! Provides the completion client abstraction and the OpenAI-compatible
//! HTTP implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{
    ChatMessage, CompletionRequest, CompletionResponse, Role, TokenUsage, ToolCall, ToolDefinition,
};

use crate::config::ResolvedLlmConfig;

/// Create a completion client from a resolved configuration
pub fn create_client(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(model = %config.model, base_url = %config.base_url, "create_client: called");
    Ok(Arc::new(OpenAIClient::from_config(config)?))
}
