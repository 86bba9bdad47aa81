//! Error types for the agent subsystem

use thiserror::Error;

/// Errors that can occur while running a turn
#[derive(Debug, Error)]
pub enum AgentError {
    /// Request failed validation before any model call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Continuation token could not be decoded or is not resumable
    #[error("Invalid continuation: {0}")]
    InvalidContinuation(String),

    /// Generation capability error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Generation capability is not configured
    #[error("No generation capability configured")]
    NoProvider,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Whether this error should be reported as a client error (4xx)
    /// rather than a stream-level failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AgentError::Validation(_) | AgentError::InvalidContinuation(_)
        )
    }
}

/// Errors specific to generation-capability calls
#[derive(Debug, Error)]
pub enum LlmError {
    /// API error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Streaming error
    #[error("Streaming error: {0}")]
    Streaming(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("Connection error: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Serialization(err.to_string())
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
