//! Database migration commands.
//!
//! Migrations are embedded from `crates/backend/migrations/` at compile
//! time, so the binary is self-contained. The pool is opened for the
//! duration of the command and closed before exit.

use sqlx::migrate::Migrator;
use thiserror::Error;

use clientdesk_backend::config::{BackendConfig, ConfigError};
use clientdesk_backend::db;

static MIGRATOR: Migrator = sqlx::migrate!("../backend/migrations");

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrateError> {
    let config = BackendConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    pool.close().await;
    tracing::info!("Migrations complete");
    Ok(())
}
