//! Error hierarchy for the lesson pipeline.
//!
//! - [`PortError`]: the generation backend could not deliver a value of the declared shape.
//! - [`ContractViolation`]: the value had the right shape but broke a domain invariant.
//! - [`PipelineError`]: root type; stage-level variants carry the stage tag.

use std::time::Duration;

use ai_llm_service::AiLlmError;
use thiserror::Error;

use crate::models::Stage;

/// Convenient alias for pipeline results.
pub type LessonResult<T> = Result<T, PipelineError>;

/// Root error type for the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller input rejected before any stage ran.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A generation call failed at `stage`.
    #[error("stage `{stage}` failed: {source}")]
    StageFailure {
        stage: Stage,
        #[source]
        source: PortError,
    },

    /// A generation call returned well-formed output that breaks an invariant.
    #[error("stage `{stage}` produced invalid output: {violation}")]
    ContractViolation {
        stage: Stage,
        violation: ContractViolation,
    },

    /// The blocking entry point could not obtain a runtime.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl PipelineError {
    /// Stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::StageFailure { stage, .. }
            | PipelineError::ContractViolation { stage, .. } => Some(*stage),
            PipelineError::InvalidRequest(_) | PipelineError::Runtime(_) => None,
        }
    }
}

/// Failure of one call to a [`GenerationPort`](crate::port::GenerationPort).
#[derive(Debug, Error)]
pub enum PortError {
    /// The backend reported an error.
    #[error(transparent)]
    Backend(#[from] AiLlmError),

    /// The backend could not be reached.
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),

    /// The per-call deadline expired.
    #[error("generation call timed out after {0:?}")]
    Timeout(Duration),

    /// The reply could not be parsed as JSON.
    #[error("malformed backend reply: {0}")]
    Malformed(String),

    /// The reply parsed but does not match the declared shape.
    #[error("reply does not match shape `{shape}`: {reason}")]
    ShapeMismatch { shape: &'static str, reason: String },
}

/// A broken domain invariant in stage output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("generated code is empty")]
    EmptyCode,

    #[error("expected {expected} explained lines, got {actual}")]
    LineCountMismatch { expected: usize, actual: usize },

    #[error("entry {position} has line number {found}, expected {expected}")]
    LineNumberOutOfSequence {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line} text does not match the source")]
    LineTextMismatch { line: usize },

    #[error("blank line {line} has an explanation")]
    BlankLineExplained { line: usize },

    #[error("line {line} has no explanation")]
    MissingExplanation { line: usize },

    #[error("summary is empty")]
    EmptySummary,

    #[error("no chunks returned for non-empty code")]
    NoChunks,

    #[error("chunk {index} has first_line {first} after last_line {last}")]
    InvertedRange {
        index: usize,
        first: usize,
        last: usize,
    },

    #[error("chunk {index} starts at line {found}, leaving a gap before it (expected {expected})")]
    Gap {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("chunk {index} starts at line {found}, overlapping the previous chunk (expected {expected})")]
    Overlap {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("chunks cover lines 1..={covered} of {total}")]
    IncompleteCoverage { covered: usize, total: usize },

    #[error("chunk {index} starts at line 0; lines are numbered from 1")]
    ZeroLine { index: usize },

    #[error("chunk {index} ends at line {last}, past the last line {total}")]
    OutOfBounds {
        index: usize,
        last: usize,
        total: usize,
    },

    #[error("chunk {index} has no rationale")]
    MissingRationale { index: usize },
}
