//! GET /health (liveness) and GET /health/ready (backend probe).

use std::sync::Arc;

use ai_llm_service::LlmProvider;
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{
    core::app_state::{AppState, SERVICE_NAME, SERVICE_VERSION},
    routes::health::health_response::{HealthResponse, ReadinessChecks, ReadinessResponse},
};

/// Liveness never touches the backend.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cfg = state.llm.config();
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy",
        timestamp: now.to_rfc3339(),
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
        model: cfg.model.clone(),
        provider: cfg.provider.as_str(),
        api_key_configured: cfg.has_api_key(),
        uptime_seconds: (now - state.started_at).num_seconds(),
    })
}

/// Handler: GET /health/ready
///
/// Returns 503 with the same body when any check fails.
pub async fn readiness(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let cfg = state.llm.config();
    let probe = state.llm.health().await;

    let checks = ReadinessChecks {
        backend: probe.ok,
        api_key: cfg.provider != LlmProvider::OpenAI || cfg.has_api_key(),
    };
    let ready = checks.backend && checks.api_key;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            timestamp: Utc::now().to_rfc3339(),
            checks,
            backend: probe,
        }),
    )
}
