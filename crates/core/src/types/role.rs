//! User roles and the status-change permission policy.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::slip::ParseEnumError;
use super::status::SlipStatus;

/// Staff role, deciding which slip statuses a user may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user management and manual sweeps.
    Admin,
    /// Front-of-house: uploads slips, marks them in store or delivered.
    Staff,
    /// Kitchen: marks slips in kitchen or ready.
    Chef,
    /// Drivers: mark slips delivered.
    Delivery,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Admin, Self::Staff, Self::Chef, Self::Delivery];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Chef => "chef",
            Self::Delivery => "delivery",
        }
    }

    /// Statuses this role may set, regardless of the slip's current status.
    #[must_use]
    pub const fn permitted_statuses(self) -> &'static [SlipStatus] {
        match self {
            Self::Admin => &SlipStatus::ALL,
            Self::Chef => &[SlipStatus::InKitchen, SlipStatus::Ready],
            Self::Staff => &[SlipStatus::InStore, SlipStatus::Delivered],
            Self::Delivery => &[SlipStatus::Delivered],
        }
    }

    #[must_use]
    pub fn can_set(self, status: SlipStatus) -> bool {
        self.permitted_statuses().contains(&status)
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| ParseEnumError::new("role", s))
    }
}

/// A status change the acting user is not allowed to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct StatusChangeDenied {
    pub role: Option<Role>,
    pub target: SlipStatus,
}

impl StatusChangeDenied {
    fn message(&self) -> String {
        match self.role {
            Some(role) => format!("role {role} may not set status \"{}\"", self.target),
            None => "sign in to change slip status".to_string(),
        }
    }
}

/// Check whether `role` may move a slip to `target`.
///
/// `None` stands for an unauthenticated or unrecognized user, who may only
/// read statuses. There is no ordering rule: a chef may move a slip from
/// `ready` back to `in kitchen`.
///
/// # Errors
///
/// Returns [`StatusChangeDenied`] when `target` is outside the role's set.
pub fn authorize_status_change(
    role: Option<Role>,
    target: SlipStatus,
) -> Result<(), StatusChangeDenied> {
    match role {
        Some(role) if role.can_set(target) => Ok(()),
        _ => Err(StatusChangeDenied { role, target }),
    }
}
