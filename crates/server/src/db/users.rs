//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use slipdesk_core::{Email, Role, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// A user to insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}

/// Partial admin edit of a user. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<Email>,
    pub role: Option<Role>,
}

/// Persistent user storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Duplicate username or email is a `Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look a user up by email or username and return the password hash too.
    async fn get_with_password(
        &self,
        login: &str,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Every user, oldest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Apply a partial edit. `None` when the id is unknown.
    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError>;

    /// Delete a user. Returns whether a row was removed.
    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

const USER_COLUMNS: &str = "id, username, email, role, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL`-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username or email"))?;

        row.try_into()
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_with_password(
        &self,
        login: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let login = login.trim();
        let row = sqlx::query_as::<_, UserPasswordRow>(&format!(
            r"
            SELECT {USER_COLUMNS}, password_hash
            FROM users
            WHERE email = lower($1) OR username = $1
            ORDER BY (email = lower($1)) DESC
            LIMIT 1
            "
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| User::try_from(r.user).map(|user| (user, r.password_hash)))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(changes.username.as_deref())
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.role.map(Role::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username or email"))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(email: &str, role: &str) -> UserRow {
        UserRow {
            id: 3,
            username: "meera".to_string(),
            email: email.to_string(),
            role: role.to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_row_converts_to_user() {
        let user = User::try_from(row("meera@example.com", "chef")).unwrap();
        assert_eq!(user.id, UserId::new(3));
        assert_eq!(user.role, Role::Chef);
    }

    #[test]
    fn test_bad_stored_values_are_data_corruption() {
        assert!(matches!(
            User::try_from(row("not-an-email", "chef")),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(matches!(
            User::try_from(row("meera@example.com", "baker")),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
