//! Connection pool setup.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Open a `SQLite` pool for `url`, creating the file if needed.
///
/// An in-memory database lives inside a single connection, so `:memory:` URLs
/// are always given a pool of one.
pub(crate) async fn open_pool(url: &str, max_connections: u32) -> Result<Pool<Sqlite>> {
    let connect_options = SqliteConnectOptions::from_str(url)
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
        .foreign_keys(true)
        .create_if_missing(true);

    let in_memory = url.contains(":memory:");
    let max_connections = if in_memory { 1 } else { max_connections.max(1) };

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        // Recycling the only connection would drop the database with it
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

    tracing::info!(max_connections, "database pool created");

    Ok(pool)
}
