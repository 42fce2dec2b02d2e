pub mod config;

use crate::core::{AdapterError, Result};
use config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Open a PostgreSQL pool for the given configuration.
///
/// The returned pool belongs to the caller. Stores built on it only clone the
/// handle, so the pool lives as long as the host keeps it (or any clone) alive.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect(&config.url)
        .await
        .map_err(|err| AdapterError::ConnectionError(Box::new(err)))?;

    info!(max_connections = config.max_connections, "connected to policy database");
    Ok(pool)
}
