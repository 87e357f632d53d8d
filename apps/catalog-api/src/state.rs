//! Application state management

use database::postgres::DatabaseConnection;
use domain_products::UploadStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: DatabaseConnection,
    pub uploads: UploadStore,
}
