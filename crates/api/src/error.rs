//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every error renders as a JSON envelope with `success: false`. Client-class
//! errors carry a `message`; storage and server failures carry a generic
//! `error` so internal details never reach clients.

use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::db::RepositoryError;
use crate::services::orders::OrderError;
use crate::services::password::PasswordError;
use crate::services::uploads::UploadError;

/// Application-level error type for the catalog API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage failed while serving a read (list, get by id, gallery update).
    ///
    /// These routes answer storage failures with 400.
    #[error("Query error: {0}")]
    Query(RepositoryError),

    /// Storage failed while serving a write.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// A dependency (the database) is not reachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a storage error raised by a read route.
    #[must_use]
    pub const fn query(err: RepositoryError) -> Self {
        Self::Query(err)
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Query(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// What the client got wrong, for not-found and bad-request errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Generic failure description, for storage and server errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if matches!(
            self,
            Self::Query(_) | Self::Database(_) | Self::Internal(_) | Self::Unavailable(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            Self::NotFound(message) | Self::BadRequest(message) => ErrorResponse {
                success: false,
                message: Some(message.clone()),
                error: None,
            },
            Self::Query(_) | Self::Database(_) => ErrorResponse {
                success: false,
                message: None,
                error: Some("database error".to_string()),
            },
            Self::Unavailable(_) => ErrorResponse {
                success: false,
                message: None,
                error: Some("service unavailable".to_string()),
            },
            Self::Internal(_) => ErrorResponse {
                success: false,
                message: None,
                error: Some("internal server error".to_string()),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Repository(err) => Self::Database(err),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("the product with the given ID was not found".to_string());
        assert_eq!(err.to_string(), "the product with the given ID was not found");

        let err = AppError::Internal("boom".to_string());
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[tokio::test]
    async fn test_client_errors_carry_message() {
        let (status, body) = render(AppError::NotFound("missing".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "missing");
        assert!(body.get("error").is_none());

        let (status, body) = render(AppError::BadRequest("name is required".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "name is required");
    }

    #[tokio::test]
    async fn test_storage_errors_hide_details() {
        let err = RepositoryError::DataCorruption("secret detail".to_string());
        let (status, body) = render(AppError::query(err)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "database error");
        assert!(body.get("message").is_none());

        let err = RepositoryError::Database(sqlx::Error::PoolTimedOut);
        let (status, body) = render(AppError::from(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_upload_errors_map_by_class() {
        let (status, _) = render(UploadError::InvalidType("image/gif".to_string()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let io = UploadError::Io(std::io::Error::other("disk full"));
        let (status, body) = render(io.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn test_order_errors_are_server_errors() {
        let err = OrderError::MissingProduct(catalog_core::OrderItemId::generate());
        let (status, _) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = render(AppError::Unavailable("db down".to_string())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
