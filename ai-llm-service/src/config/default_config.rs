//! LLM config loaded from environment variables.
//!
//! One backend is active per process, selected by `LLM_KIND`.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`         = `ollama` (default) or `openai`
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TEMPERATURE`  = sampling temperature, default `0.2`, range `0..=2`
//! - `LLM_TIMEOUT_SECS` = request timeout, default `180`
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = model name (mandatory)
//!
//! OpenAI:
//! - `OPENAI_API_KEY`  = API key (mandatory)
//! - `OPENAI_MODEL`    = model name (mandatory)
//! - `OPENAI_BASE_URL` = base URL, default `https://api.openai.com`

use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, Result, env_opt, must_var, opt_number_var},
};

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Builds and validates the active backend config from the process environment.
///
/// # Errors
/// Any [`ConfigError`] raised while reading or validating variables.
pub fn config_from_env() -> Result<LlmModelConfig> {
    config_from_lookup(|k| env_opt(k))
}

/// Same as [`config_from_env`], reading variables through `get`.
pub fn config_from_lookup<F>(get: F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = match get("LLM_KIND") {
        Some(kind) if !kind.trim().is_empty() => kind.parse::<LlmProvider>()?,
        _ => LlmProvider::Ollama,
    };

    let max_tokens = opt_number_var(&get, "LLM_MAX_TOKENS", "expected u32")?;
    let temperature = opt_number_var(&get, "LLM_TEMPERATURE", "expected a decimal number")?
        .unwrap_or(DEFAULT_TEMPERATURE);
    let timeout_secs = opt_number_var(&get, "LLM_TIMEOUT_SECS", "expected u64")?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let (model, endpoint, api_key) = match provider {
        LlmProvider::Ollama => (must_var(&get, "OLLAMA_MODEL")?, ollama_endpoint(&get)?, None),
        LlmProvider::OpenAI => {
            let key = must_var(&get, "OPENAI_API_KEY")?;
            let model = must_var(&get, "OPENAI_MODEL")?;
            let base = get("OPENAI_BASE_URL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
            (model, base, Some(key))
        }
    };

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
        json_output: true,
    };
    cfg.validate()?;

    debug!(provider = %cfg.provider, model = %cfg.model, endpoint = %cfg.endpoint, "llm config loaded");
    Ok(cfg)
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F>(get: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("OLLAMA_URL").filter(|u| !u.trim().is_empty()) {
        return Ok(url.trim().to_string());
    }
    if let Some(port) = opt_number_var::<_, u16>(get, "OLLAMA_PORT", "expected u16 (1..=65535)")? {
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::AiLlmError;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn ollama_defaults() {
        let cfg = config_from_lookup(lookup(&[
            ("OLLAMA_PORT", "11434"),
            ("OLLAMA_MODEL", "qwen2.5-coder:7b"),
        ]))
        .unwrap();
        assert_eq!(cfg.provider, LlmProvider::Ollama);
        assert_eq!(cfg.endpoint, "http://localhost:11434");
        assert_eq!(cfg.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(cfg.timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert!(cfg.json_output);
    }

    #[test]
    fn ollama_url_wins_over_port() {
        let cfg = config_from_lookup(lookup(&[
            ("OLLAMA_URL", "http://gpu-box:11434"),
            ("OLLAMA_PORT", "1"),
            ("OLLAMA_MODEL", "llama3"),
        ]))
        .unwrap();
        assert_eq!(cfg.endpoint, "http://gpu-box:11434");
    }

    #[test]
    fn ollama_without_endpoint_fails() {
        let err = config_from_lookup(lookup(&[("OLLAMA_MODEL", "llama3")])).unwrap_err();
        assert!(matches!(err, AiLlmError::Config(ConfigError::MissingVar(_))));
    }

    #[test]
    fn openai_reads_key_model_and_default_base() {
        let cfg = config_from_lookup(lookup(&[
            ("LLM_KIND", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("LLM_TEMPERATURE", "0.7"),
            ("LLM_MAX_TOKENS", "4096"),
        ]))
        .unwrap();
        assert_eq!(cfg.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.endpoint, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.temperature, Some(0.7));
        assert_eq!(cfg.max_tokens, Some(4096));
    }

    #[test]
    fn openai_without_key_fails() {
        let err = config_from_lookup(lookup(&[
            ("LLM_KIND", "openai"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn unknown_kind_and_bad_numbers_fail() {
        assert!(config_from_lookup(lookup(&[("LLM_KIND", "bard")])).is_err());
        assert!(
            config_from_lookup(lookup(&[
                ("OLLAMA_PORT", "11434"),
                ("OLLAMA_MODEL", "llama3"),
                ("LLM_TIMEOUT_SECS", "soon"),
            ]))
            .is_err()
        );
        assert!(
            config_from_lookup(lookup(&[
                ("OLLAMA_PORT", "11434"),
                ("OLLAMA_MODEL", "llama3"),
                ("LLM_TEMPERATURE", "9"),
            ]))
            .is_err()
        );
    }
}
