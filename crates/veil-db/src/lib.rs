//! Veil Database Layer
//!
//! `SQLite` persistence for removal batches and scan history, built on `SQLx`
//! with embedded migrations.
//!
//! # Example
//!
//! ```ignore
//! use veil_db::Database;
//!
//! let db = Database::connect("sqlite:veil.db", 5).await?;
//! db.run_migrations().await?;
//! let batch = veil_db::removal_requests::get_batch(db.pool(), request_id).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod connection;
pub mod error;
pub mod migrations;
pub mod removal_requests;
pub mod scans;

pub use error::{DatabaseError, Result};
pub use removal_requests::{RemovalBatchRecord, RemovalRequestRecord};
pub use scans::ScanRecord;

use sqlx::{Pool, Sqlite};

/// Handle to the service database.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the database at `url` (e.g. `sqlite:veil.db` or `sqlite::memory:`).
    ///
    /// # Errors
    /// Returns `DatabaseError::Open` if the URL is invalid or the database
    /// cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = connection::open_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the database connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
