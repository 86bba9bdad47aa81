//! # Themis - Multi-Agent HR Assistant Server
//!
//! Themis is an HTTP backend for an HR assistant that routes each user
//! message to one of several specialized agents, runs a tool-calling loop
//! against an OpenAI-compatible model, and streams progress to the client
//! as newline-delimited JSON events.
//!
//! ## Features
//!
//! - **Agent routing**: deterministic keyword classifier with an LLM
//!   fallback, plus a routing-only endpoint for confirmation flows
//! - **Tool orchestration**: recruiting tools with a human-approval gate
//!   for side-effecting actions
//! - **Pause/resume**: turns paused for approval resume from an opaque
//!   continuation token, with no server-side session state
//! - **Streaming**: NDJSON event stream with exactly one terminal event
//! - **Health Checks**: Kubernetes-ready health endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use themis::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;

use crate::adapters::chat_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::route_handler;
use crate::agents::llm::LlmProvider;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Creates the Axum application router with all endpoints configured.
///
/// `llm` is the generation backend, if one is configured; routing and
/// validation work without it, and turn endpoints degrade to a structured
/// error event.
pub async fn create_app(
    settings: Arc<RwLock<config::Settings>>,
    llm: Option<Arc<dyn LlmProvider>>,
) -> Router {
    let health_handler = Arc::new(HealthHandler::new(llm.is_some()));

    let public_router = Router::new()
        .route(
            "/health",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.health().await }
                }
            }),
        )
        .route(
            "/health/ready",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.ready().await }
                }
            }),
        )
        .route(
            "/health/live",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.live().await }
                }
            }),
        );

    let api_state = ApiState {
        settings: settings.clone(),
        llm,
    };

    let api_router = Router::new()
        .route("/chat", post(chat_handler::chat))
        .route("/chat/resume", post(chat_handler::resume))
        .route("/route", post(route_handler::route))
        .with_state(api_state);

    let mut protected_router = Router::new().nest("/api", api_router);

    // Apply rate limiting to API routes if enabled
    let settings_read = settings.read().await;
    if let Some(rate_limit) = &settings_read.rate_limit {
        if rate_limit.enabled {
            let limiter = crate::adapters::rate_limit::create_limiter(
                rate_limit.requests_per_second,
                rate_limit.burst_size,
            );

            protected_router = protected_router.layer(axum::middleware::from_fn_with_state(
                limiter,
                crate::adapters::rate_limit::rate_limit_middleware,
            ));
        }
    }
    drop(settings_read);

    let router = public_router.merge(protected_router);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
