//! Mapping of service errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use plugdir_core::PlugdirError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Optional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error returned by handlers
///
/// Not-found and validation errors carry their message to the client.
/// Everything else is logged and answered with a generic 500.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub PlugdirError);

impl ApiError {
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self(PlugdirError::not_found(message))
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self(PlugdirError::validation(message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlugdirError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlugdirError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            PlugdirError::NotFound { resource } => format!("No {}", resource),
            PlugdirError::Validation { message } => {
                warn!("Rejected request: {}", message);
                message.clone()
            }
            other => {
                error!(category = %other.category(), "Request failed: {}", other);
                "Internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            details: None,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::not_found("plugin x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(PlugdirError::database("connection reset")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_errors_are_generic() {
        let response = ApiError::from(PlugdirError::database("password=hunter2")).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "Internal server error");
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let response = ApiError::not_found("plugin with slug vim-x").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "No plugin with slug vim-x");
    }
}
