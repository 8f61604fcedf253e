//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use slipdesk_core::{Email, Role, UserId};

/// A staff account. The password hash never leaves the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
