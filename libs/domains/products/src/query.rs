//! Filter and pagination builder for the product list.
//!
//! [`ProductListQuery`] is deserialized from the query string and turned into
//! a [`BuiltQuery`]: a WHERE clause with `$n` placeholders and the values
//! bound to them, in order. The same predicate set drives both the page
//! query and the count query.

use rust_decimal::Decimal;
use sea_orm::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::models::Product;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;

const COLUMNS: &str = "id, name, slug, description, price, category, stock, image_url, created_at";

/// Query string of `GET /products`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Case-insensitive substring of name or description
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,

    /// Exact category
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,

    /// Inclusive lower price bound
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,

    /// Inclusive upper price bound
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,

    /// 1-based page, defaults to 1
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,

    /// Page size, defaults to 20
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
}

/// Treat `?key=` the same as an absent key.
fn empty_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// WHERE clause plus the values bound to its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    /// Empty, or ` WHERE ...` with a leading space
    pub where_clause: String,
    /// Values for `$1..$n`, in placeholder order
    pub params: Vec<Value>,
    pub limit: u64,
    pub offset: u64,
}

impl ProductListQuery {
    pub fn page(&self) -> u64 {
        self.page.filter(|&p| p > 0).unwrap_or(DEFAULT_PAGE)
    }

    // TODO: cap at a maximum page size once clients agree on one
    pub fn limit(&self) -> u64 {
        self.limit.filter(|&l| l > 0).unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().filter(|s| !s.is_empty())
    }

    pub fn build(&self) -> BuiltQuery {
        let mut predicates: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(term) = self.search_term() {
            params.push(format!("%{}%", escape_like(term)).into());
            let n = params.len();
            predicates.push(format!("(name ILIKE ${n} OR description ILIKE ${n})"));
        }

        if let Some(category) = self.category_filter() {
            params.push(category.to_string().into());
            predicates.push(format!("category = ${}", params.len()));
        }

        if let Some(min) = self.min_price {
            params.push(min.into());
            predicates.push(format!("price >= ${}", params.len()));
        }

        if let Some(max) = self.max_price {
            params.push(max.into());
            predicates.push(format!("price <= ${}", params.len()));
        }

        let where_clause = if predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", predicates.join(" AND "))
        };

        BuiltQuery {
            where_clause,
            params,
            limit: self.limit(),
            offset: self.offset(),
        }
    }

    /// In-process evaluation of the same predicates `build` emits.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&term);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(category) = self.category_filter() {
            if product.category != category {
                return false;
            }
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }

        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        true
    }
}

/// Escape `%`, `_` and `\` so the term matches literally under ILIKE.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl BuiltQuery {
    /// Page query: predicates, newest first, then `LIMIT`/`OFFSET`.
    pub fn select_sql(&self) -> String {
        let n = self.params.len();
        format!(
            "SELECT {COLUMNS} FROM products{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            self.where_clause,
            n + 1,
            n + 2
        )
    }

    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) AS total FROM products{}", self.where_clause)
    }

    /// Predicate values followed by limit and offset.
    pub fn select_values(&self) -> Vec<Value> {
        let mut values = self.params.clone();
        values.push(Value::BigInt(Some(to_i64(self.limit))));
        values.push(Value::BigInt(Some(to_i64(self.offset))));
        values
    }

    pub fn count_values(&self) -> Vec<Value> {
        self.params.clone()
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Pagination block of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Rows matching the filters, ignoring pagination
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, description: Option<&str>, category: &str, price: Decimal) -> Product {
        Product {
            id: 1,
            name: name.into(),
            slug: name.to_lowercase(),
            description: description.map(Into::into),
            price,
            category: category.into(),
            stock: 0,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn parse(qs: &str) -> ProductListQuery {
        axum::extract::Query::<ProductListQuery>::try_from_uri(
            &format!("/products?{qs}").parse().unwrap(),
        )
        .unwrap()
        .0
    }

    #[test]
    fn test_defaults() {
        let query = ProductListQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 0);

        let built = query.build();
        assert_eq!(built.where_clause, "");
        assert!(built.params.is_empty());
    }

    #[test]
    fn test_zero_page_and_limit_fall_back_to_defaults() {
        let query = parse("page=0&limit=0");
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 20);
    }

    #[test]
    fn test_offset_is_page_minus_one_times_limit() {
        let query = parse("page=3&limit=7");
        assert_eq!(query.offset(), 14);
        assert_eq!(parse("page=1&limit=50").offset(), 0);
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let query = parse("search=&category=&minPrice=&maxPrice=&page=&limit=");
        assert_eq!(query, ProductListQuery::default());
    }

    #[test]
    fn test_camel_case_price_bounds() {
        let query = parse("minPrice=5&maxPrice=10.50");
        assert_eq!(query.min_price, Some(Decimal::new(5, 0)));
        assert_eq!(query.max_price, Some(Decimal::new(1050, 2)));
    }

    #[test]
    fn test_all_filters_numbered_in_order() {
        let query = ProductListQuery {
            search: Some("mug".into()),
            category: Some("kitchen".into()),
            min_price: Some(Decimal::new(5, 0)),
            max_price: Some(Decimal::new(20, 0)),
            page: Some(2),
            limit: Some(10),
        };

        let built = query.build();
        assert_eq!(
            built.where_clause,
            " WHERE (name ILIKE $1 OR description ILIKE $1) AND category = $2 AND price >= $3 AND price <= $4"
        );
        assert_eq!(
            built.params,
            vec![
                Value::from("%mug%".to_string()),
                Value::from("kitchen".to_string()),
                Value::from(Decimal::new(5, 0)),
                Value::from(Decimal::new(20, 0)),
            ]
        );

        assert_eq!(
            built.select_sql(),
            format!(
                "SELECT {COLUMNS} FROM products{} ORDER BY created_at DESC, id DESC LIMIT $5 OFFSET $6",
                built.where_clause
            )
        );
        assert_eq!(
            &built.select_values()[4..],
            &[Value::BigInt(Some(10)), Value::BigInt(Some(10))]
        );
    }

    #[test]
    fn test_count_shares_predicates_without_pagination() {
        let built = ProductListQuery {
            category: Some("kitchen".into()),
            max_price: Some(Decimal::new(3, 0)),
            ..Default::default()
        }
        .build();

        assert_eq!(
            built.count_sql(),
            "SELECT COUNT(*) AS total FROM products WHERE category = $1 AND price <= $2"
        );
        assert_eq!(built.count_values(), built.params);
        assert_eq!(built.select_values().len(), built.params.len() + 2);
    }

    #[test]
    fn test_single_price_bound_uses_first_placeholder() {
        let built = ProductListQuery {
            max_price: Some(Decimal::new(3, 0)),
            ..Default::default()
        }
        .build();

        assert_eq!(built.where_clause, " WHERE price <= $1");
        assert!(built.select_sql().ends_with("LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn test_search_wildcards_are_escaped() {
        let built = ProductListQuery {
            search: Some("50%_off".into()),
            ..Default::default()
        }
        .build();

        assert_eq!(built.params, vec![Value::from("%50\\%\\_off%".to_string())]);
    }

    #[test]
    fn test_matches_mirrors_sql_predicates() {
        let mug = product("Blue Mug", Some("Ceramic"), "kitchen", Decimal::new(999, 2));
        let lamp = product("Lamp", None, "lighting", Decimal::new(2500, 2));

        let search = ProductListQuery {
            search: Some("CERAMIC".into()),
            ..Default::default()
        };
        assert!(search.matches(&mug));
        assert!(!search.matches(&lamp));

        let priced = ProductListQuery {
            min_price: Some(Decimal::new(999, 2)),
            max_price: Some(Decimal::new(2500, 2)),
            ..Default::default()
        };
        assert!(priced.matches(&mug));
        assert!(priced.matches(&lamp));

        let category = ProductListQuery {
            category: Some("kitchen".into()),
            max_price: Some(Decimal::new(5, 0)),
            ..Default::default()
        };
        assert!(!category.matches(&mug));
        assert!(!category.matches(&lamp));
    }

    #[test]
    fn test_pagination_total_pages() {
        assert_eq!(Pagination::new(0, 1, 20).total_pages, 0);
        assert_eq!(Pagination::new(5, 2, 2).total_pages, 3);
        assert_eq!(Pagination::new(20, 1, 20).total_pages, 1);
        assert_eq!(Pagination::new(21, 1, 20).total_pages, 2);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(5, 2, 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"total": 5, "page": 2, "limit": 2, "totalPages": 3})
        );
    }
}
