//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SvgStore::open` uses this module to create the SQLite pool and apply the
//! schema before any folder or svg operation runs.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::StoreConfig;

/// Initialize the SQLite connection pool and run migrations.
///
/// In-memory databases live and die with their connection, so they get a
/// single connection that is never reaped.
///
/// # Errors
///
/// Returns an error if the URL is malformed, the connection fails, or
/// migrations fail.
pub async fn init_pool(config: &StoreConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
    };

    let pool = pool_options.connect_with(options).await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
