pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every error response.
///
/// ```json
/// { "error": "Product with slug 'mug-1' already exists", "code": "DUPLICATE_SLUG" }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Machine-readable identifier
    pub code: ErrorCode,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Server-side variants answer with a generic message and log the detail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateSlug(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid path parameter: {0}")]
    Path(#[from] PathRejection),

    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    #[error("Invalid multipart body: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::DuplicateSlug(_) => ErrorCode::DuplicateSlug,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Path(_) => ErrorCode::InvalidId,
            AppError::Query(_) => ErrorCode::InvalidQuery,
            AppError::MultipartRejection(_) | AppError::Multipart(_) => {
                ErrorCode::InvalidMultipart
            }
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateSlug(_)
            | AppError::Path(_)
            | AppError::Query(_) => StatusCode::BAD_REQUEST,
            // 413 when the body limit was hit
            AppError::MultipartRejection(e) => e.status(),
            AppError::Multipart(e) => e.status(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Io(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let message = if code.is_server_error() {
            tracing::error!(error_code = code.code(), error = %self, "Request failed");
            code.default_message().to_string()
        } else {
            tracing::info!(error_code = code.code(), status = status.as_u16(), "{}", self);
            match &self {
                AppError::Path(_) => "Invalid product id".to_string(),
                AppError::Query(e) => e.body_text(),
                AppError::MultipartRejection(e) => e.body_text(),
                AppError::Multipart(e) => e.body_text(),
                _ => self.to_string(),
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Build an error response without going through [`AppError`].
pub fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_bad_request_with_code() {
        let response =
            AppError::DuplicateSlug("Product with slug 'mug-1' already exists".into())
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body.code, ErrorCode::DuplicateSlug);
        assert_eq!(body.error, "Product with slug 'mug-1' already exists");
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let response = AppError::NotFound("Product 7 not found".into()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_of(response).await;
        assert_eq!(body.code, ErrorCode::NotFound);
        assert_eq!(body.error, "Product 7 not found");
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let response =
            AppError::Database(DbErr::Custom("password authentication failed".into()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.code, ErrorCode::DatabaseError);
        assert_eq!(body.error, "Internal server error");
    }

    #[tokio::test]
    async fn test_io_error_hides_detail() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/uploads");
        let response = AppError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.code, ErrorCode::IoError);
        assert!(!body.error.contains("/srv/uploads"));
    }

    #[test]
    fn test_error_response_serializes_flat() {
        let json = serde_json::to_value(ErrorResponse::new(
            ErrorCode::ValidationError,
            "Missing required fields: name, price",
        ))
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "error": "Missing required fields: name, price",
                "code": "VALIDATION_ERROR"
            })
        );
    }
}
