//! GET /: service banner.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::core::app_state::{SERVICE_NAME, SERVICE_VERSION};

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub readiness: &'static str,
    pub generate_code: &'static str,
    pub agent_info: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
    pub timestamp: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Educational code lesson API",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
        endpoints: Endpoints {
            health: "/health",
            readiness: "/health/ready",
            generate_code: "/api/v1/generate",
            agent_info: "/api/v1/agents/info",
        },
        timestamp: Utc::now().to_rfc3339(),
    })
}
