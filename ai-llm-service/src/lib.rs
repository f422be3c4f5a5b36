//! Text-generation backends for the lesson pipeline.
//!
//! One active provider per process (Ollama or an OpenAI-compatible API),
//! selected from environment, with JSON-mode completions, a never-failing
//! readiness probe and a library-scoped tracing layer.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod llm_service;
pub mod services;
pub mod telemetry;

pub use config::default_config::config_from_env;
pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use llm_service::LlmService;
