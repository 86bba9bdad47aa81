//! Streaming chat endpoints
//!
//! `POST /api/chat` starts a turn, `POST /api/chat/resume` continues one
//! paused for tool approval. Both respond with an append-only
//! `application/x-ndjson` stream of [`StreamEvent`]s: any number of `step`
//! and `text` events, then exactly one terminal event. Validation and
//! continuation problems are rejected with a 400 before any stream opens.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::agents::classifier::{ChatSurface, Classifier};
use crate::agents::continuation::{Continuation, TurnParams};
use crate::agents::domain::{history_message, AgentKind, EventStream, Message, Role};
use crate::agents::error::AgentError;
use crate::agents::llm::LlmProvider;
use crate::agents::orchestrator::TurnOrchestrator;
use crate::config::{LimitSettings, Settings};

/// Shared state for the chat API.
#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<RwLock<Settings>>,
    pub llm: Option<Arc<dyn LlmProvider>>,
}

/// Request body for a new turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Which chat surface the request comes from; selects the classifier
    /// family when no explicit agent is given.
    #[serde(default)]
    pub surface: ChatSurface,
    /// Explicit agent choice, e.g. after the routing endpoint's
    /// human-approval prompt. Skips classification.
    #[serde(default)]
    pub agent: Option<AgentKind>,
    #[serde(default)]
    pub has_document: bool,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Request body for resuming a paused turn.
#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    #[serde(default)]
    pub continuation: String,
    #[serde(default)]
    pub approved_tool_call_ids: Vec<String>,
}

/// Start a new conversational turn.
pub async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    let limits = state.settings.read().await.limits.clone();
    if let Err(e) = validate_chat(&request, &limits) {
        return client_error(e);
    }

    let history: Vec<Message> = request
        .history
        .iter()
        .map(|h| history_message(h.role, &h.content))
        .collect();

    let agent = match request.agent {
        Some(agent) => agent,
        None => {
            let classifier = Classifier::new(state.llm.clone());
            let decision = classifier
                .classify(
                    request.surface,
                    &request.message,
                    &history,
                    request.has_document,
                )
                .await;
            tracing::info!(
                agent = decision.agent.as_str(),
                reason = decision.reason.as_deref().unwrap_or(""),
                "routed turn"
            );
            decision.agent
        }
    };

    let mut messages = history;
    messages.push(Message::user(&request.message));

    let params = TurnParams {
        job_title: request.job_title,
        location: request.location,
        rounds_used: 0,
    };

    let orchestrator = TurnOrchestrator::new(state.llm.clone(), limits.max_rounds);
    ndjson_response(orchestrator.run(agent, messages, params))
}

/// Resume a turn paused for tool approval.
pub async fn resume(State(state): State<ApiState>, Json(request): Json<ResumeRequest>) -> Response {
    if request.continuation.trim().is_empty() {
        return client_error(AgentError::Validation(
            "missing field: continuation".to_string(),
        ));
    }

    let continuation = match Continuation::decode(&request.continuation) {
        Ok(c) => c,
        Err(e) => return client_error(e),
    };

    let approved: HashSet<String> = request.approved_tool_call_ids.into_iter().collect();
    let max_rounds = state.settings.read().await.limits.max_rounds;

    let orchestrator = TurnOrchestrator::new(state.llm.clone(), max_rounds);
    ndjson_response(orchestrator.resume(continuation, approved))
}

pub(crate) fn validate_chat(request: &ChatRequest, limits: &LimitSettings) -> Result<(), AgentError> {
    if request.message.trim().is_empty() {
        return Err(AgentError::Validation(
            "message must not be empty".to_string(),
        ));
    }
    if request.message.chars().count() > limits.max_message_chars {
        return Err(AgentError::Validation(format!(
            "message exceeds {} characters",
            limits.max_message_chars
        )));
    }
    if request.history.len() > limits.max_history_messages {
        return Err(AgentError::Validation(format!(
            "history exceeds {} messages",
            limits.max_history_messages
        )));
    }
    for entry in &request.history {
        if !matches!(entry.role, Role::User | Role::Assistant) {
            return Err(AgentError::Validation(
                "history roles must be user or assistant".to_string(),
            ));
        }
        if entry.content.chars().count() > limits.max_message_chars {
            return Err(AgentError::Validation(format!(
                "history entry exceeds {} characters",
                limits.max_message_chars
            )));
        }
    }
    Ok(())
}

/// Map a rejected request to a structured error body. The wire message is
/// the bare problem description, without the error type's Display prefix.
fn client_error(error: AgentError) -> Response {
    let status = if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let message = match error {
        AgentError::Validation(m) | AgentError::InvalidContinuation(m) => m,
        other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
}

/// Wrap an event stream as an NDJSON response body.
fn ndjson_response(stream: EventStream) -> Response {
    let body = Body::from_stream(
        stream.map(|event| Ok::<Bytes, Infallible>(Bytes::from(event.to_ndjson()))),
    );

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        body,
    )
        .into_response()
}
