use sea_orm::{Database, DatabaseConnection, DbErr};
use tracing::info;

use super::PostgresConfig;
use crate::common::{retry_with_backoff, DatabaseError, DatabaseResult, RetryConfig};

/// Open a pool with the given settings. Fails on the first error.
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let target = config.redacted_url();
    let max_connections = config.max_connections;

    let db = Database::connect(config.into_connect_options()).await?;
    info!(url = %target, max_connections, "Connected to PostgreSQL");

    Ok(db)
}

/// Open a pool, retrying with backoff while the server is unreachable.
///
/// Passing `None` uses [`RetryConfig::default`].
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<DatabaseConnection> {
    let target = config.redacted_url();

    retry_with_backoff(
        || connect_from_config(config.clone()),
        retry_config.unwrap_or_default(),
    )
    .await
    .map_err(|e| DatabaseError::ConnectionFailed(format!("{target}: {e}")))
}
