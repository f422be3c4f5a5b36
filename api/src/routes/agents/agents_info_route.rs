//! GET /api/v1/agents/info: what the pipeline will do and with which model.

use std::sync::Arc;

use axum::{Json, extract::State};
use lesson_pipeline::PipelineInfo;
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct AgentsInfoResponse {
    pub model: String,
    pub provider: &'static str,
    pub stage_count: usize,
    pub pipeline: PipelineInfo,
}

pub async fn agents_info(State(state): State<Arc<AppState>>) -> Json<AgentsInfoResponse> {
    let cfg = state.llm.config();
    let pipeline = state.pipeline.describe();
    Json(AgentsInfoResponse {
        model: cfg.model.clone(),
        provider: cfg.provider.as_str(),
        stage_count: pipeline.stages.len(),
        pipeline,
    })
}
