//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::create_router;
use std::io;
use tower_http::services::ServeDir;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Full application router.
///
/// Product routes answer at the root (`/products`, `/categories`) and again
/// under the `/api` alias. `/health`, `/uploads/*` and the docs UIs sit at the root.
pub fn app(state: &AppState) -> io::Result<Router> {
    let products = products::router(state);
    let root = health::router(state.clone())
        .merge(products.clone())
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()));

    create_router::<ApiDoc>(products, root, &state.config.server, &state.config.environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig, uploads::UploadConfig};
    use database::postgres::PostgresConfig;
    use domain_products::UploadStore;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, Value};
    use serde_json::{Value as Json, json};
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn state(db: DatabaseConnection, dir: &TempDir) -> AppState {
        let uploads = UploadConfig::new(dir.path());
        AppState {
            config: Config {
                app: app_info!(),
                database: PostgresConfig::new("postgres://catalog@localhost/catalog"),
                server: ServerConfig::default(),
                uploads: uploads.clone(),
                environment: Environment::Development,
            },
            db,
            uploads: UploadStore::from_config(&uploads),
        }
    }

    fn healthy_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("?column?", Value::Int(Some(1)))])]])
            .into_connection()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Json {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_connected_database() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&state(healthy_db(), &dir)).unwrap();

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "ok", "db": "connected"})
        );
    }

    #[tokio::test]
    async fn test_health_reports_database_failure() {
        let dir = tempfile::tempdir().unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".into())])
            .into_connection();
        let app = app(&state(db, &dir)).unwrap();

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_uploads_served_from_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mug.png"), b"\x89PNG").unwrap();
        let app = app(&state(healthy_db(), &dir)).unwrap();

        let response = app.clone().oneshot(get("/uploads/mug.png")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"\x89PNG");

        let response = app.oneshot(get("/uploads/missing.png")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn empty_page_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("total", Value::BigInt(Some(0)))])]])
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection()
    }

    #[tokio::test]
    async fn test_products_served_at_root_paths() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&state(empty_page_db(), &dir)).unwrap();

        let response = app.clone().oneshot(get("/products?page=1&limit=2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"data": [], "pagination": {"total": 0, "page": 1, "limit": 2, "totalPages": 0}})
        );

        let response = app.oneshot(get("/products/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_ID");
    }

    #[tokio::test]
    async fn test_unknown_product_is_404_by_record() {
        let dir = tempfile::tempdir().unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();
        let app = app(&state(db, &dir)).unwrap();

        let response = app.oneshot(get("/products/1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_categories_served_at_root_and_api_alias() {
        let dir = tempfile::tempdir().unwrap();
        let row = |name: &str| BTreeMap::from([("category", Value::from(name))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("garden"), row("kitchen")]])
            .append_query_results([vec![row("garden"), row("kitchen")]])
            .into_connection();
        let app = app(&state(db, &dir)).unwrap();

        for uri in ["/categories", "/api/categories"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(json_body(response).await, json!(["garden", "kitchen"]));
        }
    }
}
