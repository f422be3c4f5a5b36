use std::sync::Arc;

use ai_llm_service::LlmService;
use axum::http::HeaderValue;
use chrono::{DateTime, Utc};
use lesson_pipeline::Pipeline;
use thiserror::Error;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";
pub const SERVICE_NAME: &str = "lesson-backend";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid CORS origin `{origin}`: {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

/// Which origins the CORS layer lets through.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parses a comma-separated origin list; `*` or an empty value allows any origin.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let items: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if items.is_empty() || items.contains(&"*") {
            return Ok(CorsOrigins::Any);
        }

        let mut origins = Vec::with_capacity(items.len());
        for origin in items {
            let value = HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidOrigin {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;
            origins.push(value);
        }
        Ok(CorsOrigins::List(origins))
    }
}

/// HTTP-layer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Listen address, e.g. `0.0.0.0:8000`.
    pub address: String,
    pub cors_origins: CorsOrigins,
}

impl ApiConfig {
    /// Reads `API_ADDRESS` and `CORS_ALLOW_ORIGINS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = get("API_ADDRESS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());
        let cors_origins = CorsOrigins::parse(&get("CORS_ALLOW_ORIGINS").unwrap_or_default())?;

        Ok(Self {
            address,
            cors_origins,
        })
    }
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The three-stage lesson pipeline.
    pub pipeline: Pipeline,
    /// Backend client, used for the readiness probe and model info.
    pub llm: Arc<LlmService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, llm: Arc<LlmService>) -> Self {
        Self {
            pipeline,
            llm,
            started_at: Utc::now(),
        }
    }
}
