//! # rf-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `rf-core` domain models. One [`SqliteStore`] backs all four
//! repository ports; each port lives in its own module.

mod forum;
mod post;
mod schema;
mod topic;
mod user;

use std::str::FromStr;

use rf_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Pool size used by [`SqliteStore::new`].
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// Every driver failure is a storage error; "no row" is handled by the
/// callers through `fetch_optional` before it gets here.
pub(crate) fn storage(e: sqlx::Error) -> AppError {
    AppError::Storage(e.to_string())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl SqliteStore {
    /// Opens (or creates) the database at `url` with the default pool size.
    pub async fn new(url: &str) -> Result<Self> {
        Self::connect(url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Opens the database, switches on foreign keys and makes sure the four
    /// tables exist.
    ///
    /// In-memory databases are private to a connection, so they get exactly
    /// one connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await.map_err(storage)?;
        let store = Self { pool };
        schema::create_tables(&store.pool).await?;
        Ok(store)
    }

    /// Direct pool access for seeding and maintenance scripts.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
