//! Orchestrator: drives generate → explain → chunk for one request.
//!
//! A [`Pipeline`] holds no per-run state. Each [`Pipeline::run`] owns its
//! request id, timer and artifacts, so clones can run concurrently, and
//! dropping a run mid-flight leaves nothing behind.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::cfg::PipelineConfig;
use crate::errors::{LessonResult, PipelineError};
use crate::models::{
    ChunkArtifact, CodeArtifact, ErrorDetail, ExplanationArtifact, GenerationRequest,
    PipelineResult, PipelineStatus, Stage,
};
use crate::port::GenerationPort;
use crate::stages::{CodeChunker, CodeGenerator, LineExplainer};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    GeneratingCode,
    ExplainingCode,
    ChunkingCode,
    Done(PipelineStatus),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::NotStarted => f.write_str("not_started"),
            PipelineState::GeneratingCode => f.write_str("generating_code"),
            PipelineState::ExplainingCode => f.write_str("explaining_code"),
            PipelineState::ChunkingCode => f.write_str("chunking_code"),
            PipelineState::Done(PipelineStatus::Success) => f.write_str("done(success)"),
            PipelineState::Done(PipelineStatus::Error) => f.write_str("done(error)"),
        }
    }
}

/// One stage as listed by [`Pipeline::describe`].
#[derive(Debug, Clone, Serialize)]
pub struct StageInfo {
    pub id: &'static str,
    pub stage: Stage,
    pub purpose: &'static str,
}

/// Static description of the pipeline, for the agents-info endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineInfo {
    pub stages: Vec<StageInfo>,
    pub default_language: String,
    pub stage_timeout_secs: Option<u64>,
    pub surface_partial_artifacts: bool,
}

/// Artifacts produced so far in one run.
#[derive(Default)]
struct Produced {
    code: Option<CodeArtifact>,
    explanation: Option<ExplanationArtifact>,
    chunks: Option<ChunkArtifact>,
}

#[derive(Clone)]
pub struct Pipeline {
    generator: CodeGenerator,
    explainer: LineExplainer,
    chunker: CodeChunker,
    config: PipelineConfig,
}

impl Pipeline {
    /// All three stages share `port`; each call is bounded by `config.stage_timeout`.
    pub fn new(port: Arc<dyn GenerationPort>, config: PipelineConfig) -> Self {
        let deadline = config.stage_timeout;
        Self {
            generator: CodeGenerator::new(port.clone()).with_deadline(deadline),
            explainer: LineExplainer::new(port.clone()).with_deadline(deadline),
            chunker: CodeChunker::new(port).with_deadline(deadline),
            config,
        }
    }

    /// Uses the given stages as they are; their own deadlines apply.
    pub fn from_stages(
        generator: CodeGenerator,
        explainer: LineExplainer,
        chunker: CodeChunker,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            explainer,
            chunker,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validates caller input, falling back to the configured default language.
    ///
    /// # Errors
    /// [`PipelineError::InvalidRequest`] for an empty prompt.
    pub fn request(
        &self,
        prompt: impl Into<String>,
        language: Option<&str>,
        context: Option<&str>,
    ) -> LessonResult<GenerationRequest> {
        GenerationRequest::with_default_language(
            prompt,
            language,
            context,
            &self.config.default_language,
        )
    }

    /// Runs the three stages in order and assembles the result.
    ///
    /// Never fails: stage errors are reported in `error_detail` with
    /// `status = error`. Suspends only while a stage awaits the port.
    pub async fn run(&self, request: &GenerationRequest) -> PipelineResult {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("pipeline_run", request_id = %request_id, language = %request.language());
        self.drive(request_id, request).instrument(span).await
    }

    /// Blocking form of [`Pipeline::run`] on a private current-thread runtime.
    ///
    /// # Errors
    /// [`PipelineError::Runtime`] when called from inside a Tokio runtime or when
    /// the runtime cannot be built.
    pub fn run_blocking(&self, request: &GenerationRequest) -> LessonResult<PipelineResult> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(PipelineError::Runtime(
                "run_blocking called from inside an async runtime; await run() instead".into(),
            ));
        }
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PipelineError::Runtime(e.to_string()))?;
        Ok(rt.block_on(self.run(request)))
    }

    pub fn describe(&self) -> PipelineInfo {
        PipelineInfo {
            stages: vec![
                StageInfo {
                    id: "generator",
                    stage: Stage::CodeGeneration,
                    purpose: "Generates educational source code for the prompt.",
                },
                StageInfo {
                    id: "explainer",
                    stage: Stage::LineExplanation,
                    purpose: "Explains every line of the generated code and summarizes it.",
                },
                StageInfo {
                    id: "chunker",
                    stage: Stage::Chunking,
                    purpose: "Groups the explained lines into contiguous logical chunks.",
                },
            ],
            default_language: self.config.default_language.clone(),
            stage_timeout_secs: self.config.stage_timeout.map(|d| d.as_secs()),
            surface_partial_artifacts: self.config.surface_partial_artifacts,
        }
    }

    async fn drive(&self, request_id: String, request: &GenerationRequest) -> PipelineResult {
        let started = Instant::now();
        let mut state = PipelineState::NotStarted;
        let mut produced = Produced::default();

        let outcome = self.execute(request, &mut state, &mut produced).await;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        match outcome {
            Ok(()) => {
                advance(&mut state, PipelineState::Done(PipelineStatus::Success));
                info!(elapsed_seconds, "pipeline finished");
                PipelineResult {
                    request_id,
                    status: PipelineStatus::Success,
                    elapsed_seconds,
                    code_artifact: produced.code,
                    explanation_artifact: produced.explanation,
                    chunk_artifact: produced.chunks,
                    error_detail: None,
                }
            }
            Err(err) => {
                let failed_in = state;
                advance(&mut state, PipelineState::Done(PipelineStatus::Error));
                warn!(elapsed_seconds, %failed_in, error = %err, "pipeline failed");

                let keep = self.config.surface_partial_artifacts;
                PipelineResult {
                    request_id,
                    status: PipelineStatus::Error,
                    elapsed_seconds,
                    code_artifact: produced.code.filter(|_| keep),
                    explanation_artifact: produced.explanation.filter(|_| keep),
                    chunk_artifact: None,
                    error_detail: ErrorDetail::from_error(&err),
                }
            }
        }
    }

    async fn execute(
        &self,
        request: &GenerationRequest,
        state: &mut PipelineState,
        out: &mut Produced,
    ) -> Result<(), PipelineError> {
        advance(state, PipelineState::GeneratingCode);
        let code = &*out.code.insert(self.generator.generate(request).await?);

        advance(state, PipelineState::ExplainingCode);
        let explanation = &*out.explanation.insert(self.explainer.explain(code).await?);

        advance(state, PipelineState::ChunkingCode);
        out.chunks = Some(self.chunker.chunk(explanation).await?);
        Ok(())
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    info!(from = %state, to = %next, "pipeline state");
    *state = next;
}
