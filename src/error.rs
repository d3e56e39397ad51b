use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Failures surfaced by the matching operations
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller does not own the match it tried to act on
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Server-side fault outside the store, such as token signing
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl MatchingError {
    fn error_code(&self) -> &'static str {
        match self {
            MatchingError::NotFound(_) => "not_found",
            MatchingError::Conflict(_) => "conflict",
            MatchingError::Unauthorized(_) => "unauthorized",
            MatchingError::Unauthenticated(_) => "unauthenticated",
            MatchingError::InvalidRequest(_) => "invalid_request",
            MatchingError::Internal(_) | MatchingError::Store(_) => "internal_error",
        }
    }
}

impl ResponseError for MatchingError {
    fn status_code(&self) -> StatusCode {
        match self {
            MatchingError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchingError::Conflict(_) => StatusCode::CONFLICT,
            MatchingError::Unauthorized(_) => StatusCode::FORBIDDEN,
            MatchingError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            MatchingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MatchingError::Internal(_) | MatchingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            MatchingError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                "Internal server error".to_string()
            }
            MatchingError::Internal(e) => {
                tracing::error!("Internal failure: {}", e);
                "Internal server error".to_string()
            }
            MatchingError::NotFound(m)
            | MatchingError::Conflict(m)
            | MatchingError::Unauthorized(m)
            | MatchingError::Unauthenticated(m)
            | MatchingError::InvalidRequest(m) => m.clone(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.error_code().to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}
