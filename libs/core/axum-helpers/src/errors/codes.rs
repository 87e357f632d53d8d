//! Machine-readable error codes carried in every error body.
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier for clients, an integer
//! for logs and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::DuplicateSlug;
//! assert_eq!(code.as_str(), "DUPLICATE_SLUG");
//! assert_eq!(code.code(), 1002);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Required field missing or a field value is malformed
    ValidationError,

    /// Unique slug already taken by another product
    DuplicateSlug,

    /// Path identifier is not a valid integer
    InvalidId,

    /// Query string could not be deserialized
    InvalidQuery,

    /// Multipart body could not be read
    InvalidMultipart,

    /// Requested resource was not found
    NotFound,

    /// Route exists but not for this method
    MethodNotAllowed,

    // Server errors (5000-5999)
    /// Unexpected internal failure
    InternalError,

    /// Database query or connection failure
    DatabaseError,

    /// File system failure
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DuplicateSlug => "DUPLICATE_SLUG",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::InvalidMultipart => "INVALID_MULTIPART",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::IoError => "IO_ERROR",
        }
    }

    /// Integer code for structured logs.
    ///
    /// - 1000-1999: client errors
    /// - 5000-5999: server errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::DuplicateSlug => 1002,
            Self::InvalidId => 1003,
            Self::InvalidQuery => 1004,
            Self::InvalidMultipart => 1005,
            Self::NotFound => 1006,
            Self::MethodNotAllowed => 1007,

            Self::InternalError => 5001,
            Self::DatabaseError => 5002,
            Self::IoError => 5003,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::DuplicateSlug => "Slug already exists",
            Self::InvalidId => "Invalid identifier",
            Self::InvalidQuery => "Invalid query parameters",
            Self::InvalidMultipart => "Invalid multipart body",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "Method not allowed",
            // server-side detail never reaches the client
            Self::InternalError | Self::DatabaseError | Self::IoError => "Internal server error",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.code() >= 5000
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 10] = [
        ErrorCode::ValidationError,
        ErrorCode::DuplicateSlug,
        ErrorCode::InvalidId,
        ErrorCode::InvalidQuery,
        ErrorCode::InvalidMultipart,
        ErrorCode::NotFound,
        ErrorCode::MethodNotAllowed,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::IoError,
    ];

    #[test]
    fn test_serialized_form_matches_as_str() {
        for code in ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_integer_codes_are_unique() {
        let mut ints: Vec<i32> = ALL.iter().map(ErrorCode::code).collect();
        ints.sort_unstable();
        ints.dedup();
        assert_eq!(ints.len(), ALL.len());
    }

    #[test]
    fn test_server_errors_share_generic_message() {
        for code in ALL.iter().filter(|c| c.is_server_error()) {
            assert_eq!(code.default_message(), "Internal server error");
        }
        assert!(!ErrorCode::DuplicateSlug.is_server_error());
    }

    #[test]
    fn test_error_code_deserialization() {
        let code: ErrorCode = serde_json::from_str("\"DUPLICATE_SLUG\"").unwrap();
        assert_eq!(code, ErrorCode::DuplicateSlug);
    }
}
