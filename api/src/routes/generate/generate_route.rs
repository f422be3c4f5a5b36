//! POST /api/v1/generate: runs generate -> explain -> chunk.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use lesson_pipeline::PipelineResult;
use tracing::{info, warn};

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::generate::generate_request::GenerateRequest,
};

/// Handler: POST /api/v1/generate
///
/// 200 with the full result on success, 500 with the same shape (and
/// `error_detail`) when a stage fails, 400 for an empty prompt.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/api/v1/generate \
///   -H 'content-type: application/json' \
///   -d '{"prompt":"Create a function to calculate factorial","language":"python","context":"Use recursion"}'
/// ```
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> AppResult<(StatusCode, Json<PipelineResult>)> {
    let request = state.pipeline.request(
        body.prompt,
        body.language.as_deref(),
        body.context.as_deref(),
    )?;

    let result = state.pipeline.run(&request).await;

    if result.is_success() {
        info!(
            request_id = %result.request_id,
            elapsed_seconds = result.elapsed_seconds,
            "lesson generated"
        );
        Ok((StatusCode::OK, Json(result)))
    } else {
        warn!(
            request_id = %result.request_id,
            error = ?result.error_detail,
            "lesson generation failed"
        );
        Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(result)))
    }
}
