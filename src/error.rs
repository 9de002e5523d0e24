/// Unified error types for the back-office API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::auth::token::TokenError;

/// Whether 500-class responses carry the underlying error text.
/// Only ever switched on for development deployments.
static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Enable or disable internal error details in responses
pub fn expose_internal_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

/// Main error type for the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, expired or revoked credentials
    #[error("{0}")]
    Authentication(String),

    /// Insufficient privilege
    #[error("{0}")]
    Authorization(String),

    /// No matching row
    #[error("{0}")]
    NotFound(String),

    /// Request rate above the configured quota
    #[error("Too many requests")]
    RateLimited,

    /// Query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Statement exceeded the configured timeout
    #[error("Database operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => ApiError::Internal(format!("Failed to sign token: {}", e)),
            other => ApiError::Authentication(other.to_string()),
        }
    }
}

/// Error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert ApiError to HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error, details) = match &self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database query failed");
                ("Database query failed".to_string(), Some(e.to_string()))
            }
            ApiError::Timeout(_) => {
                tracing::error!(error = %self, "Database statement timed out");
                ("Database operation timed out".to_string(), Some(self.to_string()))
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("Internal server error".to_string(), Some(msg.clone()))
            }
            _ => (self.to_string(), None),
        };

        let details = details.filter(|_| EXPOSE_DETAILS.load(Ordering::Relaxed));

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
