//! Database operations for Clientdesk `PostgreSQL`.
//!
//! # Tables
//!
//! - `clients` - Client contact records (email/phone unique)
//! - `addresses` - Postal addresses owned by clients (zip code unique,
//!   `client_id` cascades on delete)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/backend/migrations/` and run via:
//! ```bash
//! cargo run -p clientdesk-cli -- migrate run
//! ```
//!
//! Queries are built at runtime with [`sqlx::QueryBuilder`] because the
//! filter/sort contract is dynamic; values are always bound as
//! parameters, never interpolated.

pub mod addresses;
pub mod clients;
pub mod query;
pub mod table;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::PgAddressRepository;
pub use clients::PgClientRepository;
pub use table::{PgTable, TableMapper};

use crate::config::BackendConfig;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx, propagated unmodified. Unknown filter or
    /// sort columns surface here as well.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// A unique constraint rejected the write. This is the backstop for
    /// the check-then-write race: a concurrent writer that slipped past a
    /// use-case uniqueness check loses here.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Update targeted an entity that does not exist.
    #[error("not found")]
    NotFound,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_owned())
            }
            _ => Self::Database(err),
        }
    }
}

/// Result type alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Create a `PostgreSQL` connection pool from configuration.
///
/// The pool is the only shared database handle in the process: open it at
/// startup, pass it to each repository, close it at shutdown.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &BackendConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

/// Create a pool with default settings from a bare URL. Convenience for
/// tests and one-shot tools.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool_from_url(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}
