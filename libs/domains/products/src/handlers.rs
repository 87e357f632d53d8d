//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ApiQuery, AppError, IdPath,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, DuplicateSlugResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::image_url::RequestOrigin;
use crate::models::{
    DeleteResponse, ImageUpload, Product, ProductForm, ProductFormSchema, ProductList,
};
use crate::query::{Pagination, ProductListQuery};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// Room for the multipart envelope and text fields on top of the image itself
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Multipart field carrying the image file
const IMAGE_FIELD: &str = "image";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        list_categories,
    ),
    components(
        schemas(Product, ProductList, Pagination, DeleteResponse, ProductFormSchema),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            DuplicateSlugResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = State<Arc<ProductService<R>>>;

/// Product and category routes: `/products`, `/products/{id}`, `/categories`.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let body_limit = service.uploads().max_file_bytes() + FORM_OVERHEAD_BYTES;
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(shared_service)
}

/// Collect a multipart body into a [`ProductForm`].
///
/// File parts other than `image` are ignored, as is an `image` part with no bytes
/// (what browsers send when no file was chosen).
async fn read_form(multipart: Result<Multipart, MultipartRejection>) -> Result<ProductForm, AppError> {
    let mut multipart = multipart?;
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
        } else if field.file_name().is_none() {
            let value = field.text().await?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

/// List products with optional filters and pagination
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Page of products, newest first", body = ProductList),
        (status = 400, description = "Malformed query parameter"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): SharedService<R>,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Json<ProductList>, AppError> {
    let mut list = service.list_products(query).await?;
    list.data = list
        .data
        .into_iter()
        .map(|product| product.with_absolute_image_url(&origin))
        .collect();
    Ok(Json(list))
}

/// Create a product from a multipart form
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 413, description = "Request body too large"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): SharedService<R>,
    origin: RequestOrigin,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let form = read_form(multipart).await?;
    let product = service.create_product(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(product.with_absolute_image_url(&origin)),
    ))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): SharedService<R>,
    origin: RequestOrigin,
    IdPath(id): IdPath,
) -> Result<Json<Product>, AppError> {
    let product = service.get_product(id).await?;
    Ok(Json(product.with_absolute_image_url(&origin)))
}

/// Update a product; omitted fields keep their stored values
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = DuplicateSlugResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): SharedService<R>,
    origin: RequestOrigin,
    IdPath(id): IdPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>, AppError> {
    let form = read_form(multipart).await?;
    let product = service.update_product(id, form).await?;
    Ok(Json(product.with_absolute_image_url(&origin)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = DeleteResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = service.delete_product(id).await?;
    Ok(Json(deleted))
}

/// Distinct product categories, sorted
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Products",
    responses(
        (status = 200, description = "Category names", body = Vec<String>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: ProductRepository>(
    State(service): SharedService<R>,
) -> Result<Json<Vec<String>>, AppError> {
    let categories = service.categories().await?;
    Ok(Json(categories))
}
