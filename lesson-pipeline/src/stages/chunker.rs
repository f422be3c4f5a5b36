use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::errors::LessonResult;
use crate::models::{ChunkArtifact, ExplanationArtifact, Stage};
use crate::port::{ChunkDraft, GenerationPort};
use crate::stages::{invoke, violation};
use crate::validate;

pub const INSTRUCTIONS: &str = "\
You are a programming teacher splitting a program into lesson-sized pieces.
- Group contiguous lines that belong together: all imports, one function or class body, one block of top-level logic.
- Every chunk has `first_line` and `last_line` (inclusive), the covered `text`, and a `rationale` explaining the grouping.
- Chunks appear in increasing line order, never overlap, and together cover every line exactly once.
- Blank lines belong to a neighbouring chunk.";

/// Marker rendered for lines without an explanation.
pub const BLANK_MARKER: &str = "blank";

/// Renders every explained line as `<n> | <source> | <explanation or "blank">`,
/// followed by the carried summary.
pub fn build_prompt(artifact: &ExplanationArtifact) -> String {
    let mut out = format!(
        "Group the following {} lines into logical chunks.\n\
         Total lines: {}\n\n\
         Lines (number | source | explanation):\n",
        artifact.language,
        artifact.lines.len(),
    );
    for l in &artifact.lines {
        let _ = writeln!(
            out,
            "{} | {} | {}",
            l.line_number,
            l.line_text,
            l.line_explanation.as_deref().unwrap_or(BLANK_MARKER)
        );
    }
    let _ = write!(out, "\nOverall summary: {}", artifact.summary);
    out
}

/// Stage 3: [`ExplanationArtifact`] → [`ChunkArtifact`].
#[derive(Clone)]
pub struct CodeChunker {
    port: Arc<dyn GenerationPort>,
    deadline: Option<Duration>,
}

impl CodeChunker {
    pub fn new(port: Arc<dyn GenerationPort>) -> Self {
        Self { port, deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Groups the explained lines into chunks.
    ///
    /// `timestamp`, `language` and `summary` are copied from the input artifact.
    ///
    /// # Errors
    /// `StageFailure` / `ContractViolation` tagged `chunking`.
    #[instrument(skip_all, fields(stage = %Stage::Chunking))]
    pub async fn chunk(&self, explanation: &ExplanationArtifact) -> LessonResult<ChunkArtifact> {
        let draft: ChunkDraft = invoke(
            self.port.as_ref(),
            self.deadline,
            Stage::Chunking,
            INSTRUCTIONS,
            build_prompt(explanation),
        )
        .await?;

        let mut artifact = ChunkArtifact {
            timestamp: explanation.timestamp.clone(),
            language: explanation.language.clone(),
            chunks: draft.chunks,
            summary: explanation.summary.clone(),
        };

        validate::chunks(explanation.lines.len(), &artifact.chunks)
            .map_err(|v| violation(Stage::Chunking, v))?;

        // Ranges are checked above; the text is always the source they span.
        for chunk in &mut artifact.chunks {
            chunk.text = span_text(explanation, chunk.first_line, chunk.last_line);
        }
        debug!(chunks = artifact.chunks.len(), "code chunked");
        Ok(artifact)
    }
}

/// Source lines `first..=last` (1-based) joined with `\n`.
fn span_text(explanation: &ExplanationArtifact, first: usize, last: usize) -> String {
    explanation
        .lines
        .get(first.saturating_sub(1)..last)
        .unwrap_or_default()
        .iter()
        .map(|l| l.line_text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ContractViolation, PipelineError};
    use crate::models::ExplainedLine;
    use crate::port::Shaped;
    use crate::testing::ScriptedPort;
    use serde_json::json;

    fn explanation() -> ExplanationArtifact {
        ExplanationArtifact {
            timestamp: "2025-10-31T12:00:00Z".into(),
            language: "python".into(),
            lines: vec![
                ExplainedLine {
                    line_number: 1,
                    line_text: "import os".into(),
                    line_explanation: Some("Imports the os module.".into()),
                },
                ExplainedLine {
                    line_number: 2,
                    line_text: String::new(),
                    line_explanation: None,
                },
                ExplainedLine {
                    line_number: 3,
                    line_text: "print(os.name)".into(),
                    line_explanation: Some("Prints the OS family name.".into()),
                },
            ],
            summary: "Prints the operating system family.".into(),
        }
    }

    #[test]
    fn prompt_renders_each_line_with_blank_marker() {
        let p = build_prompt(&explanation());
        assert!(p.contains("1 | import os | Imports the os module.\n"));
        assert!(p.contains("2 |  | blank\n"));
        assert!(p.contains("3 | print(os.name) | Prints the OS family name.\n"));
        assert!(p.ends_with("Overall summary: Prints the operating system family."));
    }

    #[tokio::test]
    async fn carries_summary_and_provenance() {
        let port = Arc::new(ScriptedPort::new().reply(
            ChunkDraft::NAME,
            json!({
                "timestamp": "1970-01-01T00:00:00Z",
                "language": "go",
                "summary": "something else",
                "chunks": [
                    { "first_line": 1, "last_line": 3, "text": "...", "rationale": "Whole script." }
                ]
            }),
        ));
        let out = CodeChunker::new(port).chunk(&explanation()).await.unwrap();
        assert_eq!(out.summary, "Prints the operating system family.");
        assert_eq!(out.timestamp, "2025-10-31T12:00:00Z");
        assert_eq!(out.language, "python");
    }

    #[tokio::test]
    async fn overlapping_chunks_are_a_violation() {
        let port = Arc::new(ScriptedPort::new().reply(
            ChunkDraft::NAME,
            json!({
                "chunks": [
                    { "first_line": 1, "last_line": 2, "text": "", "rationale": "a" },
                    { "first_line": 2, "last_line": 3, "text": "", "rationale": "b" }
                ]
            }),
        ));
        let err = CodeChunker::new(port).chunk(&explanation()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ContractViolation {
                stage: Stage::Chunking,
                violation: ContractViolation::Overlap { index: 2, .. }
            }
        ));
    }

    #[tokio::test]
    async fn chunk_text_is_rebuilt_from_source() {
        let port = Arc::new(ScriptedPort::new().reply(
            ChunkDraft::NAME,
            json!({
                "chunks": [
                    { "first_line": 1, "last_line": 2, "text": "rm -rf / # invented", "rationale": "Setup." },
                    { "first_line": 3, "last_line": 3, "text": "", "rationale": "Output." }
                ]
            }),
        ));
        let out = CodeChunker::new(port).chunk(&explanation()).await.unwrap();
        let texts: Vec<&str> = out.chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["import os\n", "print(os.name)"]);
    }
}
