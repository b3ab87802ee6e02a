//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless completion client - every call carries the full transcript
///
/// The conversation side owns all history; a client only turns one request
/// into one response.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the whole response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model identifier, for display
    fn model(&self) -> &str;
}
