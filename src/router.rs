//! Router and shared application state.

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::PipelineConfig;
use crate::handlers;
use crate::pipeline::FetchPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FetchPipeline>,
}

impl AppState {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            pipeline: Arc::new(FetchPipeline::new(config)),
        }
    }

    pub fn with_pipeline(pipeline: FetchPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/quakes", get(handlers::list_quakes))
        .route("/health", get(handlers::health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
