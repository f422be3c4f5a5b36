//! HTTP surface for the lesson pipeline.
//!
//! Routes:
//! - `GET  /`                    banner with the endpoint list
//! - `GET  /health`              liveness
//! - `GET  /health/ready`        backend probe, 503 when not ready
//! - `GET  /api/v1/agents/info`  model and stage description
//! - `POST /api/v1/generate`     generate -> explain -> chunk

use std::sync::Arc;

pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use ai_llm_service::{LlmService, config_from_env};
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use lesson_pipeline::{LlmGenerationPort, Pipeline, PipelineConfig};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

pub use crate::core::app_state::{ApiConfig, AppState, CorsOrigins};
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::{json_extractor::json_error_mapper, request_log::log_requests},
    routes::{
        agents::agents_info_route::agents_info,
        generate::generate_route::generate,
        health::health_route::{health, readiness},
        root_route::root,
    },
};

/// Builds every component from the environment and serves until Ctrl+C.
///
/// # Errors
/// Configuration problems, a failed bind, or a server I/O error.
pub async fn start() -> Result<(), AppError> {
    let api_cfg = ApiConfig::from_env()?;
    let llm = Arc::new(LlmService::new(config_from_env()?)?);
    let pipeline_cfg = PipelineConfig::from_env();

    info!(
        provider = %llm.config().provider,
        model = %llm.config().model,
        default_language = %pipeline_cfg.default_language,
        "lesson pipeline configured"
    );

    let port = Arc::new(LlmGenerationPort::new(llm.clone()));
    let pipeline = Pipeline::new(port, pipeline_cfg);
    let state = Arc::new(AppState::new(pipeline, llm));
    let app = build_router(state, &api_cfg.cors_origins);

    let listener = TcpListener::bind(&api_cfg.address)
        .await
        .map_err(|source| AppError::Bind {
            address: api_cfg.address.clone(),
            source,
        })?;
    info!(address = %api_cfg.address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// All routes plus CORS, request logging and JSON error mapping.
pub fn build_router(state: Arc<AppState>, cors: &CorsOrigins) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/v1/agents/info", get(agents_info))
        .route("/api/v1/generate", post(generate))
        .with_state(state)
        .layer(from_fn(json_error_mapper))
        .layer(cors_layer(cors))
        .layer(from_fn(log_requests))
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => AllowOrigin::list(list.clone()),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Resolves on Ctrl+C; if the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
