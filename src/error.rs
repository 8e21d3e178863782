use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::fetcher::FetchError;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Catalog fetch failed: {0}")]
    FetchError(#[from] FetchError),

    #[error("catalog service unavailable and no fallback data found")]
    FallbackUnavailable,

    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    #[error("Normalization error: {0}")]
    NormalizationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = match &self {
            PipelineError::ConfigError(_) => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                "CONFIG_ERROR",
            ),
            PipelineError::FetchError(_) => (
                StatusCode::BAD_GATEWAY,
                "Catalog service request failed".to_string(),
                "FETCH_ERROR",
            ),
            PipelineError::FallbackUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                self.to_string(),
                "FALLBACK_UNAVAILABLE",
            ),
            PipelineError::SnapshotError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "SNAPSHOT_ERROR",
            ),
            PipelineError::NormalizationError(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                self.to_string(),
                "NORMALIZATION_ERROR",
            ),
            PipelineError::SerializationError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Data serialization failed".to_string(),
                "SERIALIZATION_ERROR",
            ),
            PipelineError::IoError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO operation failed".to_string(),
                "IO_ERROR",
            ),
            PipelineError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            ),
        };

        let body_str = serde_json::to_string(&json!({
            "error": {
                "code": error_code,
                "message": error_message,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }))
        .unwrap_or_else(|_| format!("{{\"error\":{{\"code\":\"{}\"}}}}", error_code));
        let mut resp = Response::new(Body::from(body_str));
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/json"),
        );
        resp
    }
}

// Helper functions for creating specific errors
impl PipelineError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PipelineError::ConfigError(msg.into())
    }

    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        PipelineError::SnapshotError(msg.into())
    }

    pub fn normalization<S: Into<String>>(msg: S) -> Self {
        PipelineError::NormalizationError(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PipelineError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn fallback_unavailable_maps_to_503() {
        let resp = PipelineError::FallbackUnavailable.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn fetch_error_maps_to_bad_gateway() {
        let resp = PipelineError::FetchError(FetchError::Timeout).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
