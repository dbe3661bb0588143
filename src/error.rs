// Error handling module
// Defines error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API errors that can occur during request processing
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (bad login, rejected refresh)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Error from an upstream catalog or image API
    #[error("Upstream error: {status} - {message}")]
    Upstream { status: u16, message: String },

    /// Configuration error (missing mock token values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, "auth_error", msg),
            ApiError::Upstream { status, message } => {
                let status_code =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status_code, "upstream_error", message)
            }
            ApiError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::Internal(err) => {
                // Log internal errors
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "type": error_type,
            }
        }));

        (status, body).into_response()
    }
}

/// Errors produced by a credential refresh attempt.
///
/// Cloneable so every request waiting on the same in-flight refresh can
/// receive the same outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefreshError {
    /// The refresh endpoint rejected the refresh credential
    #[error("Refresh rejected: {0}")]
    Rejected(String),

    /// The refresh call did not complete within the configured bound
    #[error("Refresh timed out")]
    Timeout,

    /// Transport failure or malformed refresh response
    #[error("Refresh failed: {0}")]
    Network(String),
}

impl From<RefreshError> for ApiError {
    fn from(err: RefreshError) -> Self {
        ApiError::Auth(err.to_string())
    }
}

/// Result type alias for API operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ApiError::Auth("Invalid credentials".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: Invalid credentials"
        );

        let err = ApiError::Upstream {
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream error: 404 - Not found");

        let err = ApiError::Config("MOCK_ACCESS_TOKEN not configured".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: MOCK_ACCESS_TOKEN not configured"
        );
    }

    #[test]
    fn test_refresh_error_messages() {
        let err = RefreshError::Rejected("Invalid refresh token".to_string());
        assert_eq!(err.to_string(), "Refresh rejected: Invalid refresh token");

        assert_eq!(RefreshError::Timeout.to_string(), "Refresh timed out");
    }

    #[test]
    fn test_refresh_error_converts_to_auth_error() {
        let err: ApiError = RefreshError::Timeout.into();
        match err {
            ApiError::Auth(msg) => assert!(msg.contains("timed out")),
            _ => panic!("Expected ApiError::Auth"),
        }
    }

    #[tokio::test]
    async fn test_error_response_conversion() {
        let err = ApiError::Auth("Invalid token".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = ApiError::Validation("bad query".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::Upstream {
            status: 404,
            message: "Not found".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_config_error_response() {
        let err = ApiError::Config("Tokens not configured".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_upstream_error_invalid_status() {
        // HTTP status codes 100-999 are valid; out-of-range falls back to 500
        let err = ApiError::Upstream {
            status: 1000,
            message: "Unknown error".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
