use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub config: String,
    pub llm: String,
}

pub struct HealthHandler {
    llm_configured: bool,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(llm_configured: bool) -> Self {
        Self {
            llm_configured,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let uptime = self.start_time.elapsed().as_secs();
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            checks: HealthChecks {
                config: "ok".to_string(),
                llm: if self.llm_configured {
                    "configured".to_string()
                } else {
                    "missing".to_string()
                },
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - the server can answer even without a generation
    /// backend (routing and validation still work), so this only reports
    /// whether generation is available.
    pub async fn ready(&self) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "llm": if self.llm_configured { "configured" } else { "missing" }
            })),
        )
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "alive"
            })),
        )
    }
}
