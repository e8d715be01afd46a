//! Error handling for AlertSrv
//!
//! The store layer only raises typed failures; the HTTP mapping below is the
//! single place where they turn into status codes and user-facing text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Result type alias
pub type Result<T> = std::result::Result<T, AlertError>;

/// Alert service error kinds
#[derive(Debug, Error)]
pub enum AlertError {
    /// Request data violates a data model constraint
    #[error("{0}")]
    Validation(String),

    /// Referenced alert does not exist
    #[error("Alert not found: {0}")]
    NotFound(String),

    /// Persistence layer failure
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid or unusable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AlertError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AlertError::Validation(_) => StatusCode::BAD_REQUEST,
            AlertError::NotFound(_) => StatusCode::NOT_FOUND,
            AlertError::Store(_) | AlertError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AlertError {
    fn from(err: sqlx::Error) -> Self {
        AlertError::Store(err.to_string())
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AlertError::Validation(msg) => msg.clone(),
            AlertError::NotFound(_) => "Alert not found".to_string(),
            AlertError::Store(_) | AlertError::Config(_) => {
                error!("Request failed: {}", self);
                "Internal server error".to_string()
            },
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AlertError::not_found("abc");
        assert_eq!(err.to_string(), "Alert not found: abc");

        let err = AlertError::validation("Bogus is not a valid visa type");
        assert_eq!(err.to_string(), "Bogus is not a valid visa type");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AlertError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AlertError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AlertError::store("disk full").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AlertError::config("bad url").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_is_masked() {
        let response = AlertError::store("database is locked").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_sqlx_error_maps_to_store() {
        let err: AlertError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AlertError::Store(_)));
    }
}
