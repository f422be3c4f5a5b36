//! Readiness probe for the configured text-generation backend.
//!
//! - Ollama: `GET {endpoint}/api/tags`, model must appear in `models[].name`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth, model must appear in `data[].id`
//!
//! [`HealthService::check`] never fails: every error becomes `ok = false`
//! with a short message, which is what `/health/ready` needs.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, is_http_endpoint, make_snippet};

/// A serializable health snapshot for one backend config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend identifier (`"ollama"` or `"openai"`).
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model the probe looked for.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: cfg.provider.as_str().to_string(),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker reusing a single HTTP client.
#[derive(Debug, Clone)]
pub struct HealthService {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional timeout (seconds, default 10).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        debug!(timeout_secs = timeout.as_secs(), "HealthService initialized");
        Ok(Self { client, timeout })
    }

    /// Probes the backend described by `cfg`. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        match self.try_probe(cfg).await {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    model = %status.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus::new(cfg, false, started.elapsed().as_millis(), err.to_string());
                warn!(
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe. Unreachable or non-2xx upstream is an error; a missing
    /// model is a reachable-but-unhealthy status.
    async fn try_probe(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        if !is_http_endpoint(&cfg.endpoint) {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let base = cfg.endpoint.trim().trim_end_matches('/');
        let url = match cfg.provider {
            LlmProvider::Ollama => format!("{base}/api/tags"),
            LlmProvider::OpenAI => format!("{base}/v1/models"),
        };

        let mut req = self.client.get(&url).timeout(self.timeout);
        if cfg.provider == LlmProvider::OpenAI {
            let key = cfg
                .api_key
                .as_deref()
                .ok_or_else(|| HealthError::Decode("missing OpenAI API key".into()))?;
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", key.trim()));
        }

        let started = Instant::now();
        debug!(provider = %cfg.provider, model = %cfg.model, "GET {}", url);
        let resp = req.send().await?;
        let latency = started.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            return Err(HealthError::HttpStatus(HttpError { status, url, snippet }).into());
        }

        let body = resp
            .text()
            .await
            .map_err(|e| HealthError::Decode(e.to_string()))?;
        let names = model_names(cfg.provider, &body)?;

        if names.iter().any(|n| n == &cfg.model) {
            Ok(HealthStatus::new(cfg, true, latency, "backend is healthy; model is available"))
        } else {
            Ok(HealthStatus::new(
                cfg,
                false,
                latency,
                format!("backend is up, but model `{}` is not listed", cfg.model),
            ))
        }
    }
}

/// Extracts the advertised model names from a tags/models listing.
fn model_names(provider: LlmProvider, body: &str) -> Result<Vec<String>, HealthError> {
    #[derive(Deserialize)]
    struct Tag {
        name: String,
    }
    #[derive(Deserialize)]
    struct Tags {
        #[serde(default)]
        models: Vec<Tag>,
    }
    #[derive(Deserialize)]
    struct ModelItem {
        id: String,
    }
    #[derive(Deserialize)]
    struct Models {
        data: Vec<ModelItem>,
    }

    let decode = |e: serde_json::Error| HealthError::Decode(format!("{e}"));
    match provider {
        LlmProvider::Ollama => serde_json::from_str::<Tags>(body)
            .map(|t| t.models.into_iter().map(|m| m.name).collect())
            .map_err(decode),
        LlmProvider::OpenAI => serde_json::from_str::<Models>(body)
            .map(|m| m.data.into_iter().map(|m| m.id).collect())
            .map_err(decode),
    }
}
