//! Generation-capability interface
//!
//! The orchestrator and the classifier's fallback tier talk to the model
//! through [`LlmProvider`]; the only concrete implementation speaks the
//! OpenAI chat-completions wire format, which also covers compatible
//! self-hosted gateways via `base_url`.

mod openai;
mod stream;

pub use openai::OpenAiProvider;
pub use stream::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agents::domain::{Message, ToolDefinition};
use crate::agents::error::LlmResult;
use crate::config::LlmSettings;

/// Trait for model providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;

    /// Complete a request (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;

    /// Complete a request with streaming
    fn complete_stream(&self, request: CompletionRequest) -> LlmStream;
}

/// Request for model completion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Tools available for calling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,
}

/// Response from model completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated message
    pub message: Message,
    /// Reason the completion stopped
    pub finish_reason: FinishReason,
}

/// Reason completion stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop
    Stop,
    /// Hit max tokens
    Length,
    /// Tool call requested
    ToolCalls,
    /// Content filtered
    ContentFilter,
}

/// Create a provider from configuration.
///
/// Returns an authentication error when no API key is available; the caller
/// decides whether to run degraded (classifier falls back, turns error out)
/// or to refuse to start.
pub fn create_provider(settings: &LlmSettings) -> LlmResult<Arc<dyn LlmProvider>> {
    let provider = OpenAiProvider::new(settings)?;
    Ok(Arc::new(provider))
}
