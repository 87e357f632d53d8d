//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Product catalog REST API with image uploads",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(crate::api::health::health),
    tags(
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Health", description = "Liveness and database reachability")
    )
)]
struct ServiceDoc;

/// Combined OpenAPI documentation for Catalog API.
///
/// Product paths are documented at the root; the `/api` alias is left out.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ServiceDoc::openapi();
        doc.merge(domain_products::ApiDoc::openapi());
        doc
    }
}
