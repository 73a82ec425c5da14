//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::services::RhythmError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => {
                let details = e.context().to_string();
                let (status, code, message) = match e {
                    RepositoryError::ValidationError { message, .. } => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
                    }
                    RepositoryError::ConnectionError { message, .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", message)
                    }
                    RepositoryError::SerializationError { message, .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR", message)
                    }
                };
                (status, ApiError::new(code, message).with_details(details))
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<RhythmError> for AppError {
    fn from(err: RhythmError) -> Self {
        match err {
            RhythmError::Repository(e) => AppError::Repository(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ErrorContext;

    #[test]
    fn test_repository_errors_map_to_status_codes() {
        let cases = [
            (
                RepositoryError::validation_with_context("empty", ErrorContext::new("upsert")),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepositoryError::connection_with_context("down", ErrorContext::new("load")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RepositoryError::serialization("corrupt record"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_repository_context_becomes_details() {
        let err = RepositoryError::validation_with_context(
            "no values",
            ErrorContext::new("upsert_sample").with_entity_id(3),
        );
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ApiError = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.message, "no values");
        assert_eq!(body.details.as_deref(), Some("[operation=upsert_sample, id=3]"));
    }

    #[test]
    fn test_task_failure_is_internal() {
        let err = AppError::from(RhythmError::Task("panicked".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
