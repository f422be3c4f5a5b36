use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::models::{ChunkArtifact, CodeArtifact, ExplanationArtifact, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Error,
}

/// Which class of failure ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The generation backend call itself failed.
    StageFailure,
    /// The backend answered in the right shape with content that breaks an invariant.
    ContractViolation,
}

/// What failed and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDetail {
    /// Builds the detail for a stage-level error; `None` for errors that are
    /// not tied to a stage (invalid request, runtime).
    pub fn from_error(err: &PipelineError) -> Option<Self> {
        let (stage, kind) = match err {
            PipelineError::StageFailure { stage, .. } => (*stage, ErrorKind::StageFailure),
            PipelineError::ContractViolation { stage, .. } => (*stage, ErrorKind::ContractViolation),
            PipelineError::InvalidRequest(_) | PipelineError::Runtime(_) => return None,
        };
        Some(Self {
            stage,
            kind,
            message: err.to_string(),
        })
    }
}

/// Combined outcome of one run.
///
/// On success all three artifacts are present and `error_detail` is absent.
/// On error `error_detail` is present; artifacts are absent unless the
/// pipeline was configured to surface the ones completed before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub request_id: String,
    pub status: PipelineStatus,
    pub elapsed_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_artifact: Option<CodeArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_artifact: Option<ExplanationArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_artifact: Option<ChunkArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ContractViolation, PortError};

    #[test]
    fn detail_carries_stage_kind_and_message() {
        let err = PipelineError::StageFailure {
            stage: Stage::LineExplanation,
            source: PortError::Unavailable("connection refused".into()),
        };
        let d = ErrorDetail::from_error(&err).unwrap();
        assert_eq!(d.stage, Stage::LineExplanation);
        assert_eq!(d.kind, ErrorKind::StageFailure);
        assert!(d.message.contains("connection refused"));

        let err = PipelineError::ContractViolation {
            stage: Stage::Chunking,
            violation: ContractViolation::NoChunks,
        };
        assert_eq!(
            ErrorDetail::from_error(&err).unwrap().kind,
            ErrorKind::ContractViolation
        );
        assert!(ErrorDetail::from_error(&PipelineError::InvalidRequest("x".into())).is_none());
    }

    #[test]
    fn error_result_omits_absent_artifacts() {
        let r = PipelineResult {
            request_id: "r".into(),
            status: PipelineStatus::Error,
            elapsed_seconds: 0.5,
            code_artifact: None,
            explanation_artifact: None,
            chunk_artifact: None,
            error_detail: Some(ErrorDetail {
                stage: Stage::CodeGeneration,
                kind: ErrorKind::StageFailure,
                message: "boom".into(),
            }),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["error_detail"]["stage"], "code_generation");
        assert_eq!(v["error_detail"]["kind"], "stage_failure");
        assert!(v.get("code_artifact").is_none());
        assert!(v.get("chunk_artifact").is_none());
    }
}
