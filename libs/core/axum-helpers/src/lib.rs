//! # Axum Helpers
//!
//! Shared HTTP plumbing for the catalog services.
//!
//! - **[`server`]**: router assembly with OpenAPI docs, graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//! - **[`errors`]**: `AppError` and the `{error, code}` response body
//! - **[`extractors`]**: `IdPath` and `ApiQuery` with JSON rejections

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{ShutdownCoordinator, create_production_app, create_router, shutdown_signal};

pub use http::{cors_layer_for, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{ApiQuery, IdPath};
