use crate::errors::PipelineError;

/// Language used when the caller does not name one.
pub const DEFAULT_LANGUAGE: &str = "python";

/// A validated generation request.
///
/// Only constructible through [`GenerationRequest::new`], so a value of this
/// type always carries a non-empty prompt and a normalized language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    language: String,
    context: Option<String>,
}

impl GenerationRequest {
    /// Validates and normalizes caller input.
    ///
    /// - `prompt` must contain non-whitespace text; it is trimmed.
    /// - `language` is trimmed and lowercased; absent or blank falls back to [`DEFAULT_LANGUAGE`].
    /// - a blank `context` counts as absent.
    ///
    /// # Errors
    /// [`PipelineError::InvalidRequest`] when the prompt is empty.
    pub fn new(
        prompt: impl Into<String>,
        language: Option<&str>,
        context: Option<&str>,
    ) -> Result<Self, PipelineError> {
        Self::with_default_language(prompt, language, context, DEFAULT_LANGUAGE)
    }

    /// Same as [`GenerationRequest::new`] with a caller-chosen fallback language.
    pub fn with_default_language(
        prompt: impl Into<String>,
        language: Option<&str>,
        context: Option<&str>,
        default_language: &str,
    ) -> Result<Self, PipelineError> {
        let prompt = prompt.into();
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }

        let language = normalize_language(language)
            .or_else(|| normalize_language(Some(default_language)))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let context = context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self {
            prompt: prompt.to_string(),
            language,
            context,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

fn normalize_language(language: Option<&str>) -> Option<String> {
    language
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_normalizes_language() {
        let r = GenerationRequest::new("add two numbers", None, None).unwrap();
        assert_eq!(r.language(), DEFAULT_LANGUAGE);

        let r = GenerationRequest::new("add", Some("  Rust "), None).unwrap();
        assert_eq!(r.language(), "rust");

        let r = GenerationRequest::new("add", Some("   "), None).unwrap();
        assert_eq!(r.language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn custom_default_language_applies_only_when_absent() {
        let r = GenerationRequest::with_default_language("x", None, None, "Go").unwrap();
        assert_eq!(r.language(), "go");
        let r = GenerationRequest::with_default_language("x", Some("c"), None, "go").unwrap();
        assert_eq!(r.language(), "c");
    }

    #[test]
    fn rejects_blank_prompt() {
        for p in ["", "   ", "\n\t"] {
            assert!(matches!(
                GenerationRequest::new(p, None, None),
                Err(PipelineError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn blank_context_is_absent() {
        let r = GenerationRequest::new("x", None, Some("  ")).unwrap();
        assert_eq!(r.context(), None);
        let r = GenerationRequest::new("x", None, Some(" for beginners ")).unwrap();
        assert_eq!(r.context(), Some("for beginners"));
    }
}
