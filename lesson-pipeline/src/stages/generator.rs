use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::errors::LessonResult;
use crate::models::{CodeArtifact, GenerationRequest, Stage, now_timestamp};
use crate::port::{CodeDraft, GenerationPort};
use crate::stages::{invoke, violation};
use crate::validate;

pub const INSTRUCTIONS: &str = "\
You are a programming teacher writing example code for students.
- Write clean, idiomatic, educational code that is syntactically correct for the requested language.
- Prefer clarity over cleverness; add short comments where they help a learner.
- Line breaks: use a single \\n to start a new line and \\n\\n to leave exactly one blank line.
- Do not wrap the code in Markdown fences and do not add prose outside the code.";

/// Marker used in the prompt when the caller gave no context.
pub const NO_CONTEXT: &str = "none provided";

/// Renders the user prompt for code generation.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let language = request.language();
    format!(
        "Generate {language} code for the following request:\n\
         {prompt}\n\n\
         Additional context: {context}\n\n\
         Requirements:\n\
         - The code must be written in {language}.\n\
         - Put the source in `code`; set `language` to \"{language}\".\n\
         - Use \\n for a new line and \\n\\n for one blank line.",
        prompt = request.prompt(),
        context = request.context().unwrap_or(NO_CONTEXT),
    )
}

/// Stage 1: request → [`CodeArtifact`].
#[derive(Clone)]
pub struct CodeGenerator {
    port: Arc<dyn GenerationPort>,
    deadline: Option<Duration>,
}

impl CodeGenerator {
    pub fn new(port: Arc<dyn GenerationPort>) -> Self {
        Self { port, deadline: None }
    }

    /// Bounds the port call; expiry is a `StageFailure` with `PortError::Timeout`.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Generates code for `request`.
    ///
    /// The artifact's `language` is the request language. A missing timestamp
    /// is backfilled with the current time.
    ///
    /// # Errors
    /// `StageFailure` / `ContractViolation` tagged `code_generation`.
    #[instrument(skip_all, fields(stage = %Stage::CodeGeneration, language = %request.language()))]
    pub async fn generate(&self, request: &GenerationRequest) -> LessonResult<CodeArtifact> {
        let draft: CodeDraft = invoke(
            self.port.as_ref(),
            self.deadline,
            Stage::CodeGeneration,
            INSTRUCTIONS,
            build_prompt(request),
        )
        .await?;

        let artifact = CodeArtifact {
            timestamp: draft
                .timestamp
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(now_timestamp),
            language: request.language().to_string(),
            code: draft.code,
        };

        validate::code(&artifact).map_err(|v| violation(Stage::CodeGeneration, v))?;
        debug!(code_len = artifact.code.len(), "code generated");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ContractViolation, PipelineError, PortError};
    use crate::port::Shaped;
    use crate::testing::ScriptedPort;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest::new("add two numbers", Some("python"), None).unwrap()
    }

    #[test]
    fn prompt_names_language_and_marks_missing_context() {
        let p = build_prompt(&request());
        assert!(p.starts_with("Generate python code for the following request:\nadd two numbers"));
        assert!(p.contains("Additional context: none provided"));

        let with_ctx = GenerationRequest::new("sort", Some("rust"), Some("use iterators")).unwrap();
        let p = build_prompt(&with_ctx);
        assert!(p.contains("Generate rust code"));
        assert!(p.contains("Additional context: use iterators"));
    }

    #[tokio::test]
    async fn backfills_timestamp_and_forces_language() {
        let port = Arc::new(ScriptedPort::new().reply(
            CodeDraft::NAME,
            json!({ "language": "Python 3", "code": "print('hi')" }),
        ));
        let artifact = CodeGenerator::new(port.clone()).generate(&request()).await.unwrap();
        assert_eq!(artifact.language, "python");
        assert!(chrono::DateTime::parse_from_rfc3339(&artifact.timestamp).is_ok());

        let calls = port.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].instructions, INSTRUCTIONS);
        assert_eq!(calls[0].shape.name, CodeDraft::NAME);
    }

    #[tokio::test]
    async fn keeps_returned_timestamp() {
        let port = Arc::new(ScriptedPort::new().reply(
            CodeDraft::NAME,
            json!({ "timestamp": "2025-10-31T12:00:00Z", "code": "x = 1" }),
        ));
        let artifact = CodeGenerator::new(port).generate(&request()).await.unwrap();
        assert_eq!(artifact.timestamp, "2025-10-31T12:00:00Z");
    }

    #[tokio::test]
    async fn port_failure_is_tagged() {
        let port = Arc::new(ScriptedPort::new().fail(CodeDraft::NAME, "backend down"));
        let err = CodeGenerator::new(port).generate(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StageFailure {
                stage: Stage::CodeGeneration,
                source: PortError::Unavailable(_)
            }
        ));
    }

    #[tokio::test]
    async fn empty_code_is_a_violation() {
        let port = Arc::new(ScriptedPort::new().reply(CodeDraft::NAME, json!({ "code": "  \n" })));
        let err = CodeGenerator::new(port).generate(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ContractViolation {
                stage: Stage::CodeGeneration,
                violation: ContractViolation::EmptyCode
            }
        ));
    }
}
