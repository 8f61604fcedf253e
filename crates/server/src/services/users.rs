//! Admin user management.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use slipdesk_core::{Email, EmailError, Role, UserId};

use crate::db::{RepositoryError, UserChanges, UserStore};
use crate::models::User;

/// Errors from user management.
#[derive(Debug, Error)]
pub enum UserAdminError {
    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("you cannot delete your own account")]
    CannotDeleteSelf,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("username cannot be blank")]
    BlankUsername,

    #[error("a user with that username or email already exists")]
    Conflict,

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for UserAdminError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::Conflict,
            other => Self::Repository(other),
        }
    }
}

/// Raw admin edit. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// User listing, editing and deletion for admins.
#[derive(Clone)]
pub struct UserAdminService {
    users: Arc<dyn UserStore>,
}

impl UserAdminService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// # Errors
    ///
    /// Returns `UserAdminError::Repository` if the store fails.
    pub async fn list_users(&self) -> Result<Vec<User>, UserAdminError> {
        Ok(self.users.list().await?)
    }

    /// Apply a partial edit to a user.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::NotFound` for an unknown id,
    /// `InvalidEmail`/`BlankUsername` for bad input and `Conflict` when the
    /// new username or email is taken.
    #[instrument(skip(self))]
    pub async fn update_user(
        &self,
        id: UserId,
        update: UserUpdate,
    ) -> Result<User, UserAdminError> {
        let username = match update.username {
            Some(name) if name.trim().is_empty() => return Err(UserAdminError::BlankUsername),
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let email = update.email.as_deref().map(Email::parse).transpose()?;

        let user = self
            .users
            .update(
                id,
                UserChanges {
                    username,
                    email,
                    role: update.role,
                },
            )
            .await?
            .ok_or(UserAdminError::NotFound(id))?;

        tracing::info!(user_id = %id, role = %user.role, "User updated");
        Ok(user)
    }

    /// Delete a user other than the acting admin.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::CannotDeleteSelf` when `id == acting`, and
    /// `NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, acting: UserId, id: UserId) -> Result<(), UserAdminError> {
        if acting == id {
            return Err(UserAdminError::CannotDeleteSelf);
        }
        if !self.users.delete(id).await? {
            return Err(UserAdminError::NotFound(id));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
