//! Catalog API - product catalog REST server

use axum_helpers::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_products::UploadStore;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        "Connecting to PostgreSQL at {}",
        config.database.redacted_url()
    );

    let db =
        database::postgres::connect_from_config_with_retry(config.database.clone(), None).await?;
    info!("Successfully connected to PostgreSQL");

    let uploads = UploadStore::from_config(&config.uploads);
    uploads.ensure_dir().await?;
    info!(dir = %uploads.dir().display(), "Serving uploads");

    let state = AppState {
        config,
        db,
        uploads,
    };

    let router = api::app(&state)?;
    let server_config = state.config.server.clone();
    let db = state.db.clone();
    drop(state);

    create_production_app(router, &server_config, SHUTDOWN_TIMEOUT, async move {
        info!("Shutting down: closing PostgreSQL pool");
        match db.close().await {
            Ok(()) => info!("PostgreSQL pool closed"),
            Err(e) => warn!(error = %e, "Failed to close PostgreSQL pool"),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
