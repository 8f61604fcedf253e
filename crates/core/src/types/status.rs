//! Slip fulfillment status.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::slip::ParseEnumError;

/// Where a cake order currently is in the bakery.
///
/// The declaration order is the intended workflow order, but transitions are
/// not forced to move forward; see [`crate::authorize_status_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum SlipStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in kitchen")]
    InKitchen,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "in store")]
    InStore,
    #[serde(rename = "delivered")]
    Delivered,
}

impl SlipStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InKitchen,
        Self::Ready,
        Self::InStore,
        Self::Delivered,
    ];

    /// Stored and displayed form (`"in kitchen"`, `"ready"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InKitchen => "in kitchen",
            Self::Ready => "ready",
            Self::InStore => "in store",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for SlipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlipStatus {
    type Err = ParseEnumError;

    /// Accepts the display form as well as `in_kitchen` / `in-kitchen`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseEnumError::new("status", s))
    }
}

/// Client-side view of a status change that has been sent but not yet
/// acknowledged.
///
/// Callers show [`OptimisticStatus::current`] immediately after
/// [`propose`](Self::propose), then either [`confirm`](Self::confirm) on
/// success or [`revert`](Self::revert) on any error so the displayed value
/// falls back to the last known-good status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticStatus {
    confirmed: SlipStatus,
    pending: Option<SlipStatus>,
}

impl OptimisticStatus {
    #[must_use]
    pub const fn new(confirmed: SlipStatus) -> Self {
        Self {
            confirmed,
            pending: None,
        }
    }

    /// The value to display right now.
    #[must_use]
    pub fn current(&self) -> SlipStatus {
        self.pending.unwrap_or(self.confirmed)
    }

    /// The last value the store acknowledged.
    #[must_use]
    pub const fn confirmed(&self) -> SlipStatus {
        self.confirmed
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Show `next` speculatively. A second proposal replaces the first.
    pub const fn propose(&mut self, next: SlipStatus) {
        self.pending = Some(next);
    }

    /// The store accepted the pending value.
    pub fn confirm(&mut self) {
        if let Some(next) = self.pending.take() {
            self.confirmed = next;
        }
    }

    /// The store rejected the change; drop the speculative value.
    pub const fn revert(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_display_and_snake_forms() {
        assert_eq!("in kitchen".parse::<SlipStatus>().unwrap(), SlipStatus::InKitchen);
        assert_eq!("IN_STORE".parse::<SlipStatus>().unwrap(), SlipStatus::InStore);
        assert_eq!(" Ready ".parse::<SlipStatus>().unwrap(), SlipStatus::Ready);
        assert!("baking".parse::<SlipStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_display_form() {
        let json = serde_json::to_string(&SlipStatus::InKitchen).unwrap();
        assert_eq!(json, "\"in kitchen\"");
        let parsed: SlipStatus = serde_json::from_str("\"in store\"").unwrap();
        assert_eq!(parsed, SlipStatus::InStore);
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(SlipStatus::default(), SlipStatus::Pending);
    }

    #[test]
    fn test_optimistic_confirm() {
        let mut status = OptimisticStatus::new(SlipStatus::Pending);
        status.propose(SlipStatus::InKitchen);
        assert_eq!(status.current(), SlipStatus::InKitchen);
        assert_eq!(status.confirmed(), SlipStatus::Pending);
        status.confirm();
        assert_eq!(status.current(), SlipStatus::InKitchen);
        assert!(!status.is_pending());
    }

    #[test]
    fn test_optimistic_revert_restores_last_good_value() {
        let mut status = OptimisticStatus::new(SlipStatus::Ready);
        status.propose(SlipStatus::Delivered);
        status.revert();
        assert_eq!(status.current(), SlipStatus::Ready);
        assert!(!status.is_pending());
    }
}
