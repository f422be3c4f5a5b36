//! Data contracts shared by the stages and the pipeline.
//!
//! Every value here is created fresh for one run and never mutated after
//! the stage that produced it returns.

pub mod artifacts;
pub mod request;
pub mod result;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use artifacts::{ChunkArtifact, CodeArtifact, CodeChunk, ExplainedLine, ExplanationArtifact};
pub use request::{DEFAULT_LANGUAGE, GenerationRequest};
pub use result::{ErrorDetail, ErrorKind, PipelineResult, PipelineStatus};

/// Identity of a pipeline stage, as it appears in logs and `error_detail.stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CodeGeneration,
    LineExplanation,
    Chunking,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::CodeGeneration, Stage::LineExplanation, Stage::Chunking];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::CodeGeneration => "code_generation",
            Stage::LineExplanation => "line_explanation",
            Stage::Chunking => "chunking",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits code into physical lines.
///
/// Lines are separated by `\n`; a trailing `\r` is dropped from each line and a
/// single terminating newline does not open an extra line. Empty code has no
/// lines. A doubled newline yields an empty (blank) line between its neighbours.
pub fn source_lines(code: &str) -> Vec<&str> {
    if code.is_empty() {
        return Vec::new();
    }
    let body = code.strip_suffix('\n').unwrap_or(code);
    body.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

/// A line is blank when it holds nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Current UTC time as RFC 3339 with second precision, e.g. `2025-10-31T12:00:00Z`.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
