// Postgres access for the catalog tables

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;

pub mod operations;
pub mod pool;
pub mod schema;

pub use operations::PgCatalogStore;
pub use pool::health_check;
pub use schema::init_schema;

/// Open the pool and probe it once so a bad `DATABASE_URL` fails at startup.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.url)
        .await
        .context("Failed to connect to Postgres")?;

    health_check(&pool).await?;
    info!(
        max = config.max_connections,
        min = config.min_connections,
        "Database pool ready"
    );

    Ok(pool)
}
