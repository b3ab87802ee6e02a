//! LLM error types

use thiserror::Error;

/// Errors that can occur during a completion call
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API responded with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = LlmError::ApiError {
            status: 401,
            message: "{\"error\":\"bad key\"}".to_string(),
        };
        assert_eq!(err.to_string(), "API responded with status 401: {\"error\":\"bad key\"}");
    }

    #[test]
    fn test_invalid_response_message() {
        let err = LlmError::InvalidResponse("No assistant message received in response".to_string());
        assert!(err.to_string().contains("No assistant message"));
    }
}
