//! HTTP error mapping.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use patient_records_core::RecordError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Json(#[from] JsonRejection),
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ApiError::Record(RecordError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Patient not found".to_string())
            }
            ApiError::Record(RecordError::AlreadyExists(_)) => {
                (StatusCode::BAD_REQUEST, "Patient already exists".to_string())
            }
            ApiError::Record(RecordError::InvalidArgument(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::Record(e @ RecordError::InvalidInput(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Record(e @ RecordError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Join(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Query(rejection) => {
                (StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
            }
            ApiError::Json(rejection) => {
                (StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
