//! HTTP error mapping for the study service.
//!
//! Pipeline errors become structured JSON payloads with a status code the
//! caller can branch on: user-correctable rejections are 4xx, upstream
//! generation trouble is 502, archive trouble is 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use dirasa_core::Error;

/// Wire shape for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable tag (e.g. "rejected", "generation_failed").
    pub kind: &'static str,
}

/// Axum-facing wrapper around the pipeline error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Generation(_) => StatusCode::BAD_GATEWAY,
        Error::Database(_) | Error::MigrationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let payload = ErrorPayload { error: self.0.to_string(), kind: self.0.kind() };
        (status, Json(payload)).into_response()
    }
}
