//! The three transformation steps. Each holds the shared port and an optional
//! per-call deadline, makes exactly one port call, applies its carry-forward
//! fields, and validates the result.

pub mod chunker;
pub mod explainer;
pub mod generator;

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::errors::{ContractViolation, PipelineError};
use crate::models::Stage;
use crate::port::{GenerationPort, Shaped, StructuredCall, generate_as};

pub use chunker::CodeChunker;
pub use explainer::LineExplainer;
pub use generator::CodeGenerator;

/// One port call tagged with `stage`.
async fn invoke<T>(
    port: &dyn GenerationPort,
    deadline: Option<Duration>,
    stage: Stage,
    instructions: &str,
    prompt: String,
) -> Result<T, PipelineError>
where
    T: Shaped + DeserializeOwned,
{
    generate_as::<T>(port, StructuredCall::new::<T>(instructions, prompt), deadline)
        .await
        .map_err(|source| {
            warn!(%stage, error = %source, "generation call failed");
            PipelineError::StageFailure { stage, source }
        })
}

fn violation(stage: Stage, violation: ContractViolation) -> PipelineError {
    warn!(%stage, %violation, "stage output rejected");
    PipelineError::ContractViolation { stage, violation }
}
