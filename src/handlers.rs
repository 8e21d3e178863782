//! HTTP handlers for the quake feed API.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::normalize::QuakeRecord;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct QuakeQuery {
    /// Start date (`YYYY-MM-DD`); defaults to now minus the configured window
    pub start: Option<String>,
    /// Minimum magnitude, passed through to the catalog service
    pub minmag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuakeListResponse {
    pub count: usize,
    pub quakes: Vec<QuakeRecord>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// `GET /quakes` — run the fetch pipeline and return normalized records.
///
/// Degraded mode (live fetch failed, no snapshot) surfaces as a 503 with
/// the error envelope; the process itself never dies for it.
pub async fn list_quakes(
    State(state): State<AppState>,
    Query(query): Query<QuakeQuery>,
) -> Result<impl IntoResponse> {
    let records = state
        .pipeline
        .fetch(query.start.as_deref(), query.minmag.as_deref())
        .await?;
    info!(count = records.len(), "serving quake feed");
    Ok(Json(QuakeListResponse {
        count: records.len(),
        quakes: records,
    }))
}

/// `GET /health` — liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        timestamp: Utc::now(),
    })
}
