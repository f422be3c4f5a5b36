use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::errors::LessonResult;
use crate::models::{CodeArtifact, ExplanationArtifact, Stage, source_lines};
use crate::port::{ExplanationDraft, GenerationPort};
use crate::stages::{invoke, violation};
use crate::validate;

pub const INSTRUCTIONS: &str = "\
You are a patient programming teacher explaining code line by line.
- Explain why each line exists, not only what it does, in a friendly teaching tone.
- Return exactly one entry per physical line, numbered from 1 with no gaps, copying the line text verbatim.
- A blank line gets `line_explanation: null`. Never use a placeholder string for blank lines.
- Every non-blank line gets a non-empty explanation.
- Finish with a `summary` that explains what the whole program does.";

/// Renders the user prompt: the fenced code, its line count, and a numbered listing.
pub fn build_prompt(artifact: &CodeArtifact) -> String {
    let lines = source_lines(&artifact.code);
    let mut out = format!(
        "Explain the following {language} code line by line.\n\n\
         ```{language}\n{code}\n```\n\n\
         The code has {n} line(s) total. Produce exactly {n} entries.\n\n\
         Lines (number | text):\n",
        language = artifact.language,
        code = artifact.code.trim_end_matches('\n'),
        n = lines.len(),
    );
    for (i, l) in lines.iter().enumerate() {
        let _ = writeln!(out, "{} | {}", i + 1, l);
    }
    out
}

/// Stage 2: [`CodeArtifact`] → [`ExplanationArtifact`].
#[derive(Clone)]
pub struct LineExplainer {
    port: Arc<dyn GenerationPort>,
    deadline: Option<Duration>,
}

impl LineExplainer {
    pub fn new(port: Arc<dyn GenerationPort>) -> Self {
        Self { port, deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Explains every physical line of `code`.
    ///
    /// `timestamp` and `language` are copied from the input artifact; whatever
    /// the backend returned for them is discarded.
    ///
    /// # Errors
    /// `StageFailure` / `ContractViolation` tagged `line_explanation`.
    #[instrument(skip_all, fields(stage = %Stage::LineExplanation))]
    pub async fn explain(&self, code: &CodeArtifact) -> LessonResult<ExplanationArtifact> {
        let draft: ExplanationDraft = invoke(
            self.port.as_ref(),
            self.deadline,
            Stage::LineExplanation,
            INSTRUCTIONS,
            build_prompt(code),
        )
        .await?;

        let mut artifact = ExplanationArtifact {
            timestamp: code.timestamp.clone(),
            language: code.language.clone(),
            lines: draft.lines,
            summary: draft.summary,
        };

        validate::explanation(&code.code, &artifact)
            .map_err(|v| violation(Stage::LineExplanation, v))?;

        // Validation tolerates trailing whitespace; the artifact carries the exact source.
        for (entry, src) in artifact.lines.iter_mut().zip(source_lines(&code.code)) {
            entry.line_text = src.to_string();
        }
        debug!(lines = artifact.lines.len(), "code explained");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ContractViolation, PipelineError};
    use crate::port::Shaped;
    use crate::testing::ScriptedPort;
    use serde_json::json;

    fn code() -> CodeArtifact {
        CodeArtifact {
            timestamp: "2025-10-31T12:00:00Z".into(),
            language: "python".into(),
            code: "import os\n\nprint(os.name)".into(),
        }
    }

    #[test]
    fn prompt_states_line_count_and_numbers_lines() {
        let p = build_prompt(&code());
        assert!(p.contains("```python\nimport os\n\nprint(os.name)\n```"));
        assert!(p.contains("The code has 3 line(s) total."));
        assert!(p.contains("1 | import os\n2 | \n3 | print(os.name)\n"));
    }

    #[tokio::test]
    async fn blank_line_gets_null_explanation() {
        let port = Arc::new(ScriptedPort::with_blank_line());
        let out = LineExplainer::new(port).explain(&code()).await.unwrap();
        let nulls: Vec<usize> = out
            .lines
            .iter()
            .filter(|l| l.line_explanation.is_none())
            .map(|l| l.line_number)
            .collect();
        assert_eq!(nulls, vec![2]);
    }

    #[tokio::test]
    async fn provenance_comes_from_input_every_time() {
        let port = Arc::new(ScriptedPort::new().reply(
            ExplanationDraft::NAME,
            json!({
                "timestamp": "1970-01-01T00:00:00Z",
                "language": "perl",
                "lines": [
                    { "line_number": 1, "line_text": "import os", "line_explanation": "Imports os." },
                    { "line_number": 2, "line_text": "", "line_explanation": null },
                    { "line_number": 3, "line_text": "print(os.name)", "line_explanation": "Prints." }
                ],
                "summary": "s"
            }),
        ));
        let explainer = LineExplainer::new(port);
        let first = explainer.explain(&code()).await.unwrap();
        let second = explainer.explain(&code()).await.unwrap();
        for out in [&first, &second] {
            assert_eq!(out.timestamp, "2025-10-31T12:00:00Z");
            assert_eq!(out.language, "python");
        }
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn miscounted_lines_are_a_violation() {
        let port = Arc::new(ScriptedPort::new().reply(
            ExplanationDraft::NAME,
            json!({
                "lines": [{ "line_number": 1, "line_text": "import os", "line_explanation": "Imports os." }],
                "summary": "s"
            }),
        ));
        let err = LineExplainer::new(port).explain(&code()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ContractViolation {
                stage: Stage::LineExplanation,
                violation: ContractViolation::LineCountMismatch { expected: 3, actual: 1 }
            }
        ));
    }

    #[tokio::test]
    async fn line_text_is_the_exact_source_line() {
        let code = CodeArtifact {
            timestamp: "2025-10-31T12:00:00Z".into(),
            language: "python".into(),
            code: "import os   \n    \nprint(os.name)".into(),
        };
        let port = Arc::new(ScriptedPort::new().reply(
            ExplanationDraft::NAME,
            json!({
                "lines": [
                    { "line_number": 1, "line_text": "import os", "line_explanation": "Imports os." },
                    { "line_number": 2, "line_text": "", "line_explanation": null },
                    { "line_number": 3, "line_text": "print(os.name)  ", "line_explanation": "Prints." }
                ],
                "summary": "s"
            }),
        ));
        let out = LineExplainer::new(port).explain(&code).await.unwrap();
        let texts: Vec<&str> = out.lines.iter().map(|l| l.line_text.as_str()).collect();
        assert_eq!(texts, source_lines(&code.code));
        assert_eq!(texts, ["import os   ", "    ", "print(os.name)"]);
    }
}
