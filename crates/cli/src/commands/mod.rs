pub mod migrate;
pub mod sweep;
pub mod user;

use slipdesk_server::config::{ConfigError, database_url_from_env};
use sqlx::PgPool;

/// Connect to the Slipdesk database. `.env` is loaded in `main`.
async fn connect() -> Result<PgPool, ConnectError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    Ok(slipdesk_server::db::create_pool(&database_url).await?)
}

/// Errors raised while connecting to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
