use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, SqlErr, Statement,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{CreateProduct, Product, UpdateProduct},
    query::ProductListQuery,
    repository::ProductRepository,
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

/// Map a write error, recognising the slug uniqueness constraint.
fn write_error(err: DbErr, slug: &str) -> ProductError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ProductError::DuplicateSlug(slug.to_string()),
        _ => ProductError::Database(err.to_string()),
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, query: ProductListQuery) -> ProductResult<(Vec<Product>, u64)> {
        let built = query.build();

        let count = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            built.count_sql(),
            built.count_values(),
        ))
        .one(&self.db)
        .await?
        .map_or(0, |row| row.total);

        let models = entity::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                built.select_sql(),
                built.select_values(),
            ))
            .all(&self.db)
            .await?;

        let total = u64::try_from(count).unwrap_or_default();
        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let slug = input.slug.clone();
        let active_model = entity::ActiveModel {
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            price: Set(input.price),
            category: Set(input.category),
            stock: Set(input.stock),
            image_url: Set(input.image_url),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, &slug))?;

        tracing::info!(product_id = model.id, slug = %model.slug, "Created product");
        Ok(model.into())
    }

    async fn update(&self, id: i32, input: UpdateProduct) -> ProductResult<Product> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let slug = input.slug.clone().unwrap_or_else(|| model.slug.clone());
        let mut active_model = model.clone().into_active_model();

        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(slug) = input.slug {
            active_model.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active_model.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active_model.price = Set(price);
        }
        if let Some(category) = input.category {
            active_model.category = Set(category);
        }
        if let Some(stock) = input.stock {
            active_model.stock = Set(stock);
        }
        if let Some(image_url) = input.image_url {
            active_model.image_url = Set(Some(image_url));
        }

        if !active_model.is_changed() {
            return Ok(model.into());
        }

        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => ProductError::NotFound(id),
                other => write_error(other, &slug),
            })?;

        tracing::info!(product_id = id, "Updated product");
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn categories(&self) -> ProductResult<Vec<String>> {
        let categories = entity::Entity::find()
            .select_only()
            .column(entity::Column::Category)
            .distinct()
            .order_by_asc(entity::Column::Category)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;

        Ok(categories)
    }

    async fn image_in_use(&self, image_url: &str) -> ProductResult<bool> {
        let referencing = entity::Entity::find()
            .select_only()
            .column(entity::Column::Id)
            .filter(entity::Column::ImageUrl.eq(image_url))
            .into_tuple::<i32>()
            .one(&self.db)
            .await?;

        Ok(referencing.is_some())
    }
}
