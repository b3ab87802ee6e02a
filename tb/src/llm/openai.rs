//! OpenAI-compatible chat completions client
//!
//! Works against any endpoint that speaks the `/chat/completions` dialect
//! (Groq, OpenAI, local gateways).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ChatMessage, CompletionRequest, CompletionResponse, LlmClient, LlmError, Role, TokenUsage, ToolCall};
use crate::config::ResolvedLlmConfig;

/// OpenAI-compatible API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenAIClient {
    /// Create a new client from resolved configuration
    pub fn from_config(config: &ResolvedLlmConfig) -> Result<Self, LlmError> {
        debug!(?config, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body for the chat completions API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, message_count = request.messages.len(), "build_request_body: called");

        let messages: Vec<serde_json::Value> = request.messages.iter().map(convert_message).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if !request.tools.is_empty() {
            debug!("build_request_body: tools not empty, adding tools");
            body["tools"] = serde_json::json!(request.tools.iter().map(|t| t.to_openai_schema()).collect::<Vec<_>>());
            body["tool_choice"] = serde_json::json!("auto");
        } else {
            debug!("build_request_body: no tools");
        }

        body
    }

    /// Turn a status and raw body into a completion or an error
    fn handle_body(&self, status: StatusCode, text: String) -> Result<CompletionResponse, LlmError> {
        if !status.is_success() {
            debug!(%status, "handle_body: API error");
            let message = if text.trim().is_empty() {
                "No error details".to_string()
            } else {
                text
            };
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        debug!("handle_body: success");
        let api_response: OpenAIResponse = serde_json::from_str(&text)?;
        self.parse_response(api_response)
    }

    /// Parse the API response, requiring `choices[0].message`
    fn parse_response(&self, api_response: OpenAIResponse) -> Result<CompletionResponse, LlmError> {
        debug!(choice_count = api_response.choices.len(), "parse_response: called");
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No assistant message received in response".to_string()))?;

        let message = choice
            .message
            .ok_or_else(|| LlmError::InvalidResponse("No assistant message received in response".to_string()))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                input: serde_json::from_str(&tc.function.arguments).unwrap_or(serde_json::json!({})),
            })
            .collect();

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: message.content,
            tool_calls,
            usage,
        })
    }
}

/// Convert one transcript message to the wire shape
fn convert_message(msg: &ChatMessage) -> serde_json::Value {
    match msg.role {
        Role::User => serde_json::json!({ "role": "user", "content": msg.content }),
        Role::Assistant if !msg.tool_calls.is_empty() => {
            let tool_calls: Vec<serde_json::Value> = msg
                .tool_calls
                .iter()
                .map(|tc| {
                    serde_json::json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": tc.input.to_string(),
                        }
                    })
                })
                .collect();
            let content = if msg.content.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::json!(msg.content)
            };
            serde_json::json!({
                "role": "assistant",
                "content": content,
                "tool_calls": tool_calls,
            })
        }
        Role::Assistant => serde_json::json!({ "role": "assistant", "content": msg.content }),
        Role::Tool => {
            let mut value = serde_json::json!({
                "role": "tool",
                "tool_call_id": msg.tool_call_id,
                "content": msg.content,
            });
            if let Some(name) = &msg.name {
                value["name"] = serde_json::json!(name);
            }
            value
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, "complete: called");
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = if status.is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };
        self.handle_body(status, text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
