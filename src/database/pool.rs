use crate::config::get_config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(30))
}

/// Connects eagerly so a bad `DATABASE_URL` fails at startup.
pub async fn create_pool() -> Result<PgPool> {
    let config = get_config();
    let pool = pool_options(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Pool that only connects on first use. Routes that reject a request before
/// reading reports never touch the database.
pub fn create_lazy_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = pool_options(max_connections).connect_lazy(database_url)?;
    Ok(pool)
}
