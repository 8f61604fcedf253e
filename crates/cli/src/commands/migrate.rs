//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! slipdesk migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SLIPDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Applies `crates/server/migrations/` and creates the session table used by
//! the server's session layer.

use slipdesk_server::db::MigrationError;
use thiserror::Error;

use super::ConnectError;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Run all Slipdesk migrations.
///
/// # Errors
///
/// Returns `MigrateError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrateError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    slipdesk_server::db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
