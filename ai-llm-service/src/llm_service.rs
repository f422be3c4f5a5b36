//! Shared text-generation service for the active backend.
//!
//! - Built once at startup from [`LlmModelConfig`], wrapped in `Arc`, cloned into dependents.
//! - Dispatches to [`OllamaService`] or [`OpenAiService`] through a private enum,
//!   so callers never depend on a concrete client.
//! - Carries its own [`HealthService`] for readiness probes.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{config::default_config::config_from_env, llm_service::LlmService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmService::new(config_from_env()?)?);
//! let json = svc.generate("Return {\"ok\": true}", Some("Reply with JSON only.")).await?;
//! let status = svc.health().await;
//! println!("{json} / ready = {}", status.ok);
//! # Ok(()) }
//! ```

use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

#[derive(Debug)]
enum Backend {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
}

/// One configured backend plus its health checker.
#[derive(Debug)]
pub struct LlmService {
    cfg: LlmModelConfig,
    backend: Backend,
    health: HealthService,
}

impl LlmService {
    /// Validates `cfg` and builds the matching provider client.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the config is invalid or a client cannot be built.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        cfg.validate()?;
        let backend = match cfg.provider {
            LlmProvider::Ollama => Backend::Ollama(OllamaService::new(cfg.clone())?),
            LlmProvider::OpenAI => Backend::OpenAI(OpenAiService::new(cfg.clone())?),
        };
        Ok(Self {
            health: HealthService::new(Some(10))?,
            cfg,
            backend,
        })
    }

    /// Runs one completion.
    ///
    /// `system` is sent as the system message (OpenAI) or `system` field (Ollama).
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        debug!(provider = %self.cfg.provider, model = %self.cfg.model, "dispatching generation");
        match &self.backend {
            Backend::Ollama(cli) => cli.generate(prompt, system).await,
            Backend::OpenAI(cli) => cli.generate(prompt, system).await,
        }
    }

    /// Probes the backend; never fails.
    pub async fn health(&self) -> HealthStatus {
        self.health.check(&self.cfg).await
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }
}
