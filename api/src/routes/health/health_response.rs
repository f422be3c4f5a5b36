use ai_llm_service::HealthStatus;
use serde::Serialize;

/// Response payload for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
    pub model: String,
    pub provider: &'static str,
    pub api_key_configured: bool,
    pub uptime_seconds: i64,
}

/// Individual readiness checks.
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    /// Backend reachable and the configured model listed.
    pub backend: bool,
    /// An API key is present when the provider needs one.
    pub api_key: bool,
}

/// Response payload for GET /health/ready.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub timestamp: String,
    pub checks: ReadinessChecks,
    /// Raw probe result, for operators.
    pub backend: HealthStatus,
}
