use axum::body::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ProductError, ProductResult};

/// Product as stored and as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// Unique, URL-safe identifier
    pub slug: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "9.99")]
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    /// Relative upload path when stored; always absolute in responses
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(slug) = update.slug {
            self.slug = slug;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
    }
}

/// Insert payload, already checked for required fields
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CreateProduct {
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(length(max = 100))]
    pub category: String,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub image_url: Option<String>,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct UpdateProduct {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

impl UpdateProduct {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// File part of a product form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Raw multipart form as submitted for create and update.
///
/// Text values are trimmed and empty ones are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub stock: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Record a text field. Unknown names are ignored.
    pub fn set_text(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "slug" => &mut self.slug,
            "description" => &mut self.description,
            "price" => &mut self.price,
            "category" => &mut self.category,
            "stock" => &mut self.stock,
            "imageUrl" | "image_url" => &mut self.image_url,
            _ => return,
        };
        *slot = non_empty(value);
    }

    /// Build an insert payload. Reports every missing required field at once.
    pub fn to_create(&self) -> ProductResult<CreateProduct> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("slug", &self.slug),
            ("price", &self.price),
            ("category", &self.category),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ProductError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let input = CreateProduct {
            name: self.name.clone().unwrap_or_default(),
            slug: self.slug.clone().unwrap_or_default(),
            description: self.description.clone(),
            price: parse_price(self.price.as_deref().unwrap_or_default())?,
            category: self.category.clone().unwrap_or_default(),
            stock: self.stock.as_deref().map(parse_stock).transpose()?.unwrap_or(0),
            image_url: self.image_url.clone(),
        };

        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;
        Ok(input)
    }

    /// Build a partial update from whichever fields were supplied.
    pub fn to_update(&self) -> ProductResult<UpdateProduct> {
        let input = UpdateProduct {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            price: self.price.as_deref().map(parse_price).transpose()?,
            category: self.category.clone(),
            stock: self.stock.as_deref().map(parse_stock).transpose()?,
            image_url: self.image_url.clone(),
        };

        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;
        Ok(input)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Exclusive bound on price magnitude for the `NUMERIC(10, 2)` column
const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

fn parse_price(raw: &str) -> ProductResult<Decimal> {
    let price = Decimal::from_str(raw)
        .map_err(|_| ProductError::Validation(format!("Invalid price: '{raw}'")))?;

    if price.normalize().scale() > 2 || price.abs() >= PRICE_LIMIT {
        return Err(ProductError::Validation(format!(
            "Price must be below {PRICE_LIMIT} with at most 2 decimal places, got '{raw}'"
        )));
    }
    Ok(price)
}

fn parse_stock(raw: &str) -> ProductResult<i32> {
    match raw.parse::<i32>() {
        Ok(stock) if stock >= 0 => Ok(stock),
        _ => Err(ProductError::Validation(format!(
            "Stock must be a non-negative integer, got '{raw}'"
        ))),
    }
}

/// Page of products plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductList {
    pub data: Vec<Product>,
    pub pagination: crate::query::Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i32,
}

/// Multipart body accepted by create and update (documentation only)
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ProductFormSchema {
    /// Required on create
    name: Option<String>,
    /// Required on create, unique
    slug: Option<String>,
    description: Option<String>,
    /// Decimal string, required on create
    price: Option<String>,
    /// Required on create
    category: Option<String>,
    /// Non-negative integer, defaults to 0
    stock: Option<i32>,
    /// External image URL, used when no file is uploaded
    image_url: Option<String>,
    /// JPEG, PNG, GIF or WebP, at most 5 MB
    #[schema(value_type = String, format = Binary)]
    image: Option<Vec<u8>>,
}
