use serde::Serialize;

use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32};

/// Configuration for one text-generation backend.
///
/// The API key is never serialized; use [`LlmModelConfig::has_api_key`] for
/// status payloads.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model_config::LlmModelConfig;
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "qwen2.5-coder:7b".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     max_tokens: Some(2048),
///     temperature: Some(0.2),
///     top_p: None,
///     timeout_secs: Some(180),
///     json_output: true,
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmModelConfig {
    /// The backend family.
    pub provider: LlmProvider,

    /// Model identifier (e.g. `"gpt-4o-mini"`, `"qwen2.5-coder:7b"`).
    pub model: String,

    /// Base URL of the backend, without the API path.
    pub endpoint: String,

    /// API key for providers that require authentication.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Ask the backend to reply with a single JSON object.
    pub json_output: bool,
}

impl LlmModelConfig {
    /// Checks the invariants every provider client relies on.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyModel`] for a blank model name
    /// - [`ConfigError::InvalidFormat`] for a non-http(s) endpoint
    /// - [`ConfigError::OutOfRange`] for temperature outside `0..=2` or top_p outside `0..=1`
    /// - [`ConfigError::MissingVar`] when OpenAI is selected without a key
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", &self.endpoint)?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        if self.provider == LlmProvider::OpenAI && !self.has_api_key() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY").into());
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::AiLlmError;

    fn base() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "qwen2.5-coder:7b".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(30),
            json_output: true,
        }
    }

    #[test]
    fn accepts_sane_ollama_config() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_blank_model() {
        let cfg = LlmModelConfig { model: "  ".into(), ..base() };
        assert!(matches!(
            cfg.validate(),
            Err(AiLlmError::Config(ConfigError::EmptyModel))
        ));
    }

    #[test]
    fn rejects_temperature_out_of_range() {
        let cfg = LlmModelConfig { temperature: Some(3.0), ..base() };
        assert!(matches!(
            cfg.validate(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { field: "temperature", .. }))
        ));
    }

    #[test]
    fn openai_requires_key() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::OpenAI,
            endpoint: "https://api.openai.com".into(),
            ..base()
        };
        assert!(cfg.validate().is_err());

        let with_key = LlmModelConfig { api_key: Some("sk-test".into()), ..cfg };
        assert!(with_key.validate().is_ok());
    }

    #[test]
    fn api_key_is_not_serialized() {
        let cfg = LlmModelConfig { api_key: Some("sk-secret".into()), ..base() };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
