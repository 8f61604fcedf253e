//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first admin (self-registration only creates staff)
//! SLIPDESK_USER_PASSWORD=... slipdesk user create -u owner -e owner@example.com -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `SLIPDESK_DATABASE_URL` - `PostgreSQL` connection string
//! - `SLIPDESK_USER_PASSWORD` - Password for the new user

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use slipdesk_core::{Role, UserId};
use slipdesk_server::db::PgUserStore;
use slipdesk_server::services::{AuthError, AuthService};
use thiserror::Error;

use super::ConnectError;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, staff, chef, delivery")]
    InvalidRole(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new user with the given role.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` for an unknown role, invalid input, a taken
/// username or email, or a database failure.
pub async fn create_user(
    username: &str,
    email: &str,
    role: &str,
    password: &SecretString,
) -> Result<UserId, UserError> {
    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;

    let pool = super::connect().await?;
    let auth = AuthService::new(Arc::new(PgUserStore::new(pool)));

    tracing::info!("Creating user: {} <{}> ({})", username, email, role);
    let user = auth
        .create_user(username, email, password.expose_secret(), role)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );

    Ok(user.id)
}
