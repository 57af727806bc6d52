//! Quantum Choice Observatory: API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use observatory_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The narrative graph could not be loaded or the store not opened.
    #[error("content error: {0}")]
    Content(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::BranchNotFound(_) => (StatusCode::NOT_FOUND, "branch_not_found"),
            DomainError::NodeNotFound(_) => (StatusCode::NOT_FOUND, "node_not_found"),
            DomainError::ChoiceNotFound { .. } => (StatusCode::BAD_REQUEST, "choice_not_found"),
            DomainError::BranchLimitReached(_) => (StatusCode::CONFLICT, "branch_limit_reached"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_branch_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::BranchNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_node_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::NodeNotFound("nowhere".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_choice_not_found_maps_to_400() {
        assert_eq!(
            status_of(DomainError::ChoiceNotFound {
                node_id: "origin".into(),
                choice_id: "logic-archive".into(),
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_branch_limit_reached_maps_to_409() {
        assert_eq!(
            status_of(DomainError::BranchLimitReached(4)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("bad snapshot".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("lock poisoned".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
