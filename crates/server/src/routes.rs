//! HTTP route handlers.
//!
//! Two inbound operations: submit an activity description for a study, and
//! browse the full archive. Everything else is middleware.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use dirasa_client::{ClassifierClient, GeneratorClient};
use dirasa_core::{StudyPipeline, StudyRecord, StudyResponse};

use crate::error::ApiError;

/// Shared application state: the pipeline with its injected providers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<StudyPipeline<ClassifierClient, GeneratorClient>>,
}

/// Inbound body for `POST /api/studies`.
#[derive(Debug, Deserialize)]
pub struct StudyRequest {
    /// Free-text description of the economic activity.
    pub activity: String,
}

/// Outbound body for `GET /api/studies`.
#[derive(Debug, Serialize)]
pub struct StudiesPayload {
    pub studies: Vec<StudyRecord>,
}

/// Submit an activity description; serves from the archive or generates.
pub async fn create_study(
    State(state): State<AppState>, Json(request): Json<StudyRequest>,
) -> Result<Json<StudyResponse>, ApiError> {
    let response = state.pipeline.handle_study_request(&request.activity).await?;
    Ok(Json(response))
}

/// Browse every archived study, newest first.
pub async fn list_studies(State(state): State<AppState>) -> Result<Json<StudiesPayload>, ApiError> {
    let studies = state.pipeline.list_studies().await?;
    Ok(Json(StudiesPayload { studies }))
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirasa_core::{CanonicalActivity, Source};

    #[test]
    fn test_study_request_deserializes() {
        let request: StudyRequest = serde_json::from_str(r#"{"activity":"محل ملابس"}"#).unwrap();
        assert_eq!(request.activity, "محل ملابس");
    }

    #[test]
    fn test_study_request_missing_field_is_error() {
        let result = serde_json::from_str::<StudyRequest>(r#"{"query":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_study_response_wire_shape() {
        let response = StudyResponse {
            content: "<h3>دراسة</h3>".into(),
            source: Source::Archive,
            official_name: CanonicalActivity::new("تجارة الملابس الجاهزة").unwrap(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["source"], "archive");
        assert_eq!(json["official_name"], "تجارة الملابس الجاهزة");
        assert_eq!(json["content"], "<h3>دراسة</h3>");
    }

    #[test]
    fn test_studies_payload_wire_shape() {
        let payload = StudiesPayload {
            studies: vec![StudyRecord {
                id: 1,
                activity_name: "تربية المواشي".into(),
                content: "<h3>x</h3>".into(),
                created_at: "2026-08-30T00:00:00+00:00".into(),
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["studies"][0]["activity_name"], "تربية المواشي");
        assert_eq!(json["studies"][0]["id"], 1);
    }
}
