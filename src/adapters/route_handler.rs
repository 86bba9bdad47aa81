//! Routing-only endpoint
//!
//! `POST /api/route` runs the deterministic assistant-surface classifier and
//! returns the suggested agent without starting a turn, so clients can show
//! a "hand off to X?" confirmation before committing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::agents::classifier;
use crate::agents::domain::AgentKind;

use super::chat_handler::ApiState;

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub suggested_agent: AgentKind,
    pub reason: String,
    pub required_questions: Vec<String>,
}

pub async fn route(State(state): State<ApiState>, Json(request): Json<RouteRequest>) -> Response {
    let limits = state.settings.read().await.limits.clone();
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "message must not be empty" })),
        )
            .into_response();
    }
    if request.message.chars().count() > limits.max_message_chars {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("message exceeds {} characters", limits.max_message_chars)
            })),
        )
            .into_response();
    }

    let decision = classifier::classify_assistant(&request.message);
    Json(RouteResponse {
        suggested_agent: decision.agent,
        reason: decision.reason.unwrap_or_default(),
        required_questions: decision.required_questions,
    })
    .into_response()
}
