use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use crate::uploads::UploadError;
use crate::validation::pipeline::PipelineError;

const SUBMISSION_FAILED_MESSAGE: &str = "Submission failed, please try again";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Submission failed: {0}")]
    Submission(#[from] PipelineError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upload(e) => upload_status(e),
            AppError::Submission(e) => {
                tracing::error!("Submission failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SUBMISSION_FAILED",
                    SUBMISSION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn upload_status(e: &UploadError) -> (StatusCode, &'static str, String) {
    match e {
        UploadError::UnsupportedType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_MEDIA_TYPE",
            e.to_string(),
        ),
        UploadError::TooLarge { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", e.to_string())
        }
        UploadError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE", e.to_string()),
        UploadError::Multipart(inner) if inner.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", e.to_string())
        }
        UploadError::Multipart(_) => (StatusCode::BAD_REQUEST, "INVALID_MULTIPART", e.to_string()),
        UploadError::Io(inner) => {
            tracing::error!("Upload storage error: {inner}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPLOAD_FAILED",
                "The file could not be stored".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pipeline_failure_renders_generic_message() {
        let err = AppError::from(PipelineError::StoreFailure(StoreError::Database(
            sqlx::Error::PoolTimedOut,
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "SUBMISSION_FAILED");
        assert_eq!(value["error"]["message"], SUBMISSION_FAILED_MESSAGE);
    }

    #[test]
    fn test_upload_errors_map_to_client_statuses() {
        let cases = [
            (
                AppError::from(UploadError::UnsupportedType("image/png".to_string())),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::from(UploadError::TooLarge { max: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::from(UploadError::MissingFile),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
