//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{ProductError, ProductResult};
use crate::models::{DeleteResponse, Product, ProductForm, ProductList};
use crate::query::{Pagination, ProductListQuery};
use crate::repository::ProductRepository;
use crate::uploads::{UploadStore, local_file_name, resolve_image_reference};

/// Product service providing business logic operations
///
/// Turns submitted forms into repository calls and keeps uploaded files in
/// step with the rows that reference them.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    uploads: UploadStore,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            uploads: self.uploads.clone(),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, uploads: UploadStore) -> Self {
        Self {
            repository: Arc::new(repository),
            uploads,
        }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// One page of products with pagination metadata
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductListQuery) -> ProductResult<ProductList> {
        let (page, limit) = (query.page(), query.limit());
        let (data, total) = self.repository.list(query).await?;

        Ok(ProductList {
            data,
            pagination: Pagination::new(total, page, limit),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Create a product from a submitted form.
    ///
    /// Required fields are checked before anything is written. A stored
    /// image is removed again if the insert fails.
    #[instrument(skip(self, form), fields(slug = ?form.slug))]
    pub async fn create_product(&self, mut form: ProductForm) -> ProductResult<Product> {
        let image = form.image.take();
        let mut input = form.to_create()?;

        let uploaded = match image {
            Some(image) => Some(self.uploads.save(image).await?),
            None => None,
        };
        input.image_url =
            resolve_image_reference(uploaded.clone(), input.image_url.as_deref(), None);

        match self.repository.create(input).await {
            Ok(product) => Ok(product),
            Err(e) => {
                self.discard_upload(uploaded.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Apply the supplied fields of a form to an existing product.
    ///
    /// The stored image reference is kept unless a file or URL is supplied.
    /// A replaced local upload is removed after the update succeeds.
    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: i32, mut form: ProductForm) -> ProductResult<Product> {
        let existing = self.get_product(id).await?;
        let image = form.image.take();
        let mut input = form.to_update()?;

        let uploaded = match image {
            Some(image) => Some(self.uploads.save(image).await?),
            None => None,
        };
        input.image_url = resolve_image_reference(
            uploaded.clone(),
            input.image_url.as_deref(),
            existing.image_url.clone(),
        );

        let updated = match self.repository.update(id, input).await {
            Ok(product) => product,
            Err(e) => {
                self.discard_upload(uploaded.as_deref()).await;
                return Err(e);
            }
        };

        if let Some(previous) = existing.image_url.as_deref() {
            if updated.image_url.as_deref() != Some(previous) {
                self.release_image(previous).await;
            }
        }

        Ok(updated)
    }

    /// Delete a product and its uploaded image, if any
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> ProductResult<DeleteResponse> {
        let existing = self.get_product(id).await?;

        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }

        if let Some(image_url) = existing.image_url.as_deref() {
            self.release_image(image_url).await;
        }

        Ok(DeleteResponse {
            message: "Product deleted".to_string(),
            id,
        })
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> ProductResult<Vec<String>> {
        self.repository.categories().await
    }

    /// Remove a local upload once no product references it any more.
    ///
    /// Clients may submit an existing `/uploads/...` path as `imageUrl`, so a
    /// file can be shared between rows.
    async fn release_image(&self, reference: &str) {
        if local_file_name(reference).is_none() {
            return;
        }

        match self.repository.image_in_use(reference).await {
            Ok(false) => self.uploads.remove(reference).await,
            Ok(true) => debug!(file = ?local_file_name(reference), "Image still referenced, keeping file"),
            Err(e) => warn!(error = %e, "Could not check image references, keeping file"),
        }
    }

    async fn discard_upload(&self, uploaded: Option<&str>) {
        if let Some(path) = uploaded {
            warn!(file = ?local_file_name(path), "Write failed, discarding uploaded image");
            self.uploads.remove(path).await;
        }
    }
}
