//! Public entry for the lesson pipeline.
//!
//! Turns a natural-language prompt into three artifacts: source code, a
//! line-by-line explanation, and a grouping of the code into logical chunks.
//!
//! 1) **Step 1: Code generation** (`code_generation`)
//!    - Build the prompt from request prompt, language and context
//!    - Call the port for a `generated_code` shape
//!    - Backfill a missing timestamp, pin the language, reject empty code
//!
//! 2) **Step 2: Line explanation** (`line_explanation`)
//!    - Send the code with its physical line count
//!    - Copy timestamp and language from step 1
//!    - Check `1..=N` numbering, verbatim text, `null` on blank lines
//!
//! 3) **Step 3: Chunking** (`chunking`)
//!    - Send every explained line plus the summary
//!    - Carry timestamp, language and summary forward unchanged
//!    - Check that chunks tile `1..=N` exactly once, in order
//!
//! Any failure stops the run; [`Pipeline::run`] reports it in the result's
//! `error_detail` together with the stage tag and the elapsed time.
//!
//! The generation backend is reached only through [`GenerationPort`]; the
//! production implementation is [`LlmGenerationPort`].

pub mod cfg;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod port;
pub mod stages;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use cfg::PipelineConfig;
pub use errors::{ContractViolation, LessonResult, PipelineError, PortError};
pub use models::{
    ChunkArtifact, CodeArtifact, CodeChunk, ErrorDetail, ErrorKind, ExplainedLine,
    ExplanationArtifact, GenerationRequest, PipelineResult, PipelineStatus, Stage,
};
pub use pipeline::{Pipeline, PipelineInfo, PipelineState, StageInfo};
pub use port::{GenerationPort, LlmGenerationPort, OutputShape, PortFuture, StructuredCall};
