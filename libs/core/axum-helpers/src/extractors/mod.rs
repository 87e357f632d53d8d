//! Extractors that reject with the workspace error body instead of axum's plain text.

pub mod id_path;
pub mod query;

pub use id_path::IdPath;
pub use query::ApiQuery;
