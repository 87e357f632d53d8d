//! Configuration for Catalog API

use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig, uploads::UploadConfig};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub uploads: UploadConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            database: PostgresConfig::from_env()?,
            server: ServerConfig::from_env()?,
            uploads: UploadConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
