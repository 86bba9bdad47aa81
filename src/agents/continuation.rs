//! Continuation codec
//!
//! A continuation is a fully self-contained snapshot of a turn paused for
//! tool approval: the whole transcript plus the turn parameters, encoded as
//! base64 JSON. No server-side state outlives the request; the token is the
//! only thing that crosses the pause/resume boundary.
//!
//! The token is legible to the client and must not be trusted: the resume
//! path validates structural well-formedness here and re-derives approval
//! requirements from the live gate, never from the payload's shape.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::agents::domain::{AgentKind, Message, Role, ToolCall};
use crate::agents::error::{AgentError, AgentResult};

/// Parameters of a turn that must survive the pause.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Model-call rounds already consumed before the pause; the resumed
    /// loop continues against the same per-turn budget.
    #[serde(default)]
    pub rounds_used: u32,
}

/// Serialized state of a turn paused mid-flight, waiting on approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Continuation {
    pub agent: AgentKind,
    /// Full transcript, including auto-executed tool results from before
    /// the pause so they are never re-run on resume.
    pub messages: Vec<Message>,
    #[serde(default)]
    pub params: TurnParams,
}

impl Continuation {
    pub fn new(agent: AgentKind, messages: Vec<Message>, params: TurnParams) -> Self {
        Self {
            agent,
            messages,
            params,
        }
    }

    /// Encode as an opaque token safe for text-only transports.
    pub fn encode(&self) -> AgentResult<String> {
        let payload = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Decode and structurally validate a token. Every failure mode is a
    /// client error, never a crash.
    pub fn decode(token: &str) -> AgentResult<Continuation> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim()).map_err(|_| {
            AgentError::InvalidContinuation("token is not valid base64".to_string())
        })?;

        let continuation: Continuation = serde_json::from_slice(&bytes).map_err(|_| {
            AgentError::InvalidContinuation("payload is not well-formed".to_string())
        })?;

        continuation.validate()?;
        Ok(continuation)
    }

    /// The tool calls still awaiting a decision: those on the paused batch
    /// without a recorded `tool` result after it.
    pub fn pending_calls(&self) -> Vec<ToolCall> {
        let Some(index) = self.paused_batch_index() else {
            return Vec::new();
        };

        let resolved: Vec<&str> = self.messages[index + 1..]
            .iter()
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();

        self.messages[index]
            .tool_calls()
            .iter()
            .filter(|call| !resolved.contains(&call.id.as_str()))
            .cloned()
            .collect()
    }

    /// Index of the assistant message whose batch paused the turn.
    /// Auto-executed calls leave `tool` results behind it, so the batch is
    /// not necessarily the last message.
    fn paused_batch_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .rposition(|m| m.role == Role::Assistant && !m.tool_calls().is_empty())
    }

    fn validate(&self) -> AgentResult<()> {
        if self.messages.is_empty() {
            return Err(AgentError::InvalidContinuation(
                "transcript is empty".to_string(),
            ));
        }

        let Some(index) = self.paused_batch_index() else {
            return Err(AgentError::InvalidContinuation(
                "no pending tool calls to resume".to_string(),
            ));
        };

        // Only tool results may sit between the paused batch and the end of
        // the transcript, and at least one call must still be unresolved.
        if self.messages[index + 1..].iter().any(|m| m.role != Role::Tool)
            || self.pending_calls().is_empty()
        {
            return Err(AgentError::InvalidContinuation(
                "no pending tool calls to resume".to_string(),
            ));
        }

        Ok(())
    }
}
