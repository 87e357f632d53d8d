use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::query::ProductListQuery;

/// Data access for products.
///
/// Implementations report a taken slug as [`ProductError::DuplicateSlug`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// One page of matching products, newest first, plus the total match count
    async fn list(&self, query: ProductListQuery) -> ProductResult<(Vec<Product>, u64)>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Fails with `NotFound` when `id` does not exist
    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product>;

    /// Returns whether a row was deleted
    async fn delete(&self, id: i32) -> ProductResult<bool>;

    /// Distinct categories, sorted
    async fn categories(&self) -> ProductResult<Vec<String>>;

    /// Whether any product still stores `image_url` as its image reference
    async fn image_in_use(&self, image_url: &str) -> ProductResult<bool>;
}

/// In-memory implementation for tests and local experiments
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
    next_id: AtomicI32,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, query: ProductListQuery) -> ProductResult<(Vec<Product>, u64)> {
        let products = self.products.read().await;

        let mut matching: Vec<Product> = products
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit()).unwrap_or(usize::MAX))
            .collect();

        Ok((page, total))
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        if products.iter().any(|p| p.slug == input.slug) {
            return Err(ProductError::DuplicateSlug(input.slug));
        }

        let product = Product {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: input.name,
            slug: input.slug,
            description: input.description,
            price: input.price,
            category: input.category,
            stock: input.stock,
            image_url: input.image_url,
            created_at: Utc::now(),
        };
        products.push(product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        if let Some(slug) = &input.slug {
            if products.iter().any(|p| p.id != id && &p.slug == slug) {
                return Err(ProductError::DuplicateSlug(slug.clone()));
            }
        }

        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ProductError::NotFound(id))?;
        product.apply_update(input);

        tracing::info!(product_id = id, "Updated product");
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);

        let deleted = products.len() < before;
        if deleted {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(deleted)
    }

    async fn categories(&self) -> ProductResult<Vec<String>> {
        let products = self.products.read().await;
        let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn image_in_use(&self, image_url: &str) -> ProductResult<bool> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .any(|p| p.image_url.as_deref() == Some(image_url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(slug: &str, category: &str, cents: i64) -> CreateProduct {
        CreateProduct {
            name: format!("Product {slug}"),
            slug: slug.to_string(),
            description: None,
            price: Decimal::new(cents, 2),
            category: category.to_string(),
            stock: 1,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryProductRepository::new();

        let product = repo.create(input("mug-1", "kitchen", 999)).await.unwrap();
        assert_eq!(product.id, 1);

        let fetched = repo.get_by_id(product.id).await.unwrap();
        assert_eq!(fetched, Some(product));
        assert_eq!(repo.get_by_id(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_slug_error() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("mug-1", "kitchen", 999)).await.unwrap();

        let result = repo.create(input("mug-1", "kitchen", 500)).await;
        assert!(matches!(result, Err(ProductError::DuplicateSlug(ref s)) if s == "mug-1"));
    }

    #[tokio::test]
    async fn test_update_to_taken_slug_fails() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("mug-1", "kitchen", 999)).await.unwrap();
        let lamp = repo.create(input("lamp", "lighting", 2500)).await.unwrap();

        let result = repo
            .update(
                lamp.id,
                UpdateProduct {
                    slug: Some("mug-1".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ProductError::DuplicateSlug(_))));

        // keeping its own slug is fine
        let same = repo
            .update(
                lamp.id,
                UpdateProduct {
                    slug: Some("lamp".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(same.is_ok());
    }

    #[tokio::test]
    async fn test_list_paginates_newest_first() {
        let repo = InMemoryProductRepository::new();
        for i in 1..=5 {
            repo.create(input(&format!("k{i}"), "kitchen", 100 * i))
                .await
                .unwrap();
        }
        repo.create(input("lamp", "lighting", 100)).await.unwrap();

        let query = ProductListQuery {
            category: Some("kitchen".into()),
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let (page, total) = repo.list(query).await.unwrap();

        assert_eq!(total, 5);
        let slugs: Vec<&str> = page.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["k3", "k2"]);
    }

    #[tokio::test]
    async fn test_delete_and_categories() {
        let repo = InMemoryProductRepository::new();
        let mug = repo.create(input("mug-1", "kitchen", 999)).await.unwrap();
        repo.create(input("lamp", "lighting", 2500)).await.unwrap();
        repo.create(input("pan", "kitchen", 3000)).await.unwrap();

        assert_eq!(repo.categories().await.unwrap(), vec!["kitchen", "lighting"]);

        assert!(repo.delete(mug.id).await.unwrap());
        assert!(!repo.delete(mug.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_image_in_use_tracks_stored_references() {
        let repo = InMemoryProductRepository::new();
        let mut mug = input("mug-1", "kitchen", 999);
        mug.image_url = Some("/uploads/mug.png".into());
        let mug = repo.create(mug).await.unwrap();

        assert!(repo.image_in_use("/uploads/mug.png").await.unwrap());
        assert!(!repo.image_in_use("/uploads/other.png").await.unwrap());

        repo.delete(mug.id).await.unwrap();
        assert!(!repo.image_in_use("/uploads/mug.png").await.unwrap());
    }
}
