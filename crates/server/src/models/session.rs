//! Session-related types for authentication.

use serde::{Deserialize, Serialize};

use slipdesk_core::{Email, Role, UserId};

use super::user::User;

/// Session-stored identity of the signed-in user.
///
/// Refreshed from the user store on every authenticated request, so an admin
/// role change applies to sessions that are already open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
