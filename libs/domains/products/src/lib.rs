//! Products Domain
//!
//! Product catalog backed by PostgreSQL: filtered and paginated listing,
//! multipart create/update with image uploads, delete, and category listing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart parsing, absolute image URLs
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Form validation, image resolution, upload lifecycle
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + PostgreSQL / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, query builder
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, PgProductRepository, ProductService, UploadStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = sea_orm::Database::connect("postgres://localhost/catalog").await?;
//!
//! let repository = PgProductRepository::new(db);
//! let service = ProductService::new(repository, UploadStore::new("uploads", 5 * 1024 * 1024));
//!
//! // Serves `/products`, `/products/{id}` and `/categories`
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod image_url;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod service;
pub mod uploads;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use image_url::{RequestOrigin, normalize_image_url};
pub use models::{
    CreateProduct, DeleteResponse, ImageUpload, Product, ProductForm, ProductList, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use query::{Pagination, ProductListQuery};
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
pub use uploads::UploadStore;
