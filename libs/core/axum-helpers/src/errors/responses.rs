//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "error": "Internal server error",
        "code": "DATABASE_ERROR"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - missing or malformed fields",
    content_type = "application/json",
    example = json!({
        "error": "Missing required fields: name, slug",
        "code": "VALIDATION_ERROR"
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - slug already in use",
    content_type = "application/json",
    example = json!({
        "error": "Product with slug 'mug-1' already exists",
        "code": "DUPLICATE_SLUG"
    })
)]
pub struct DuplicateSlugResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - identifier is not an integer",
    content_type = "application/json",
    example = json!({
        "error": "Invalid product id",
        "code": "INVALID_ID"
    })
)]
pub struct BadRequestIdResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "error": "Product 42 not found",
        "code": "NOT_FOUND"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);
