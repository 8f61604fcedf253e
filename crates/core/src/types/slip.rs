//! The slip record and its enumerated fields.

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::SlipId;
use super::status::SlipStatus;

/// An input string that is not one of an enum's accepted values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: \"{value}\"")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.trim().to_string(),
        }
    }
}

/// Declares a closed set of lowercase string values with `as_str`,
/// `Display` and case-insensitive `FromStr`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == normalized)
                    .ok_or_else(|| ParseEnumError::new($kind, s))
            }
        }
    };
}

text_enum! {
    /// Store location the order belongs to.
    Branch, "branch" {
        Khamla => "khamla",
        Sakkardara => "sakkardara",
        Dharampeth => "dharampeth",
    }
}

text_enum! {
    /// Whether the cake is driven out or collected.
    DeliveryType, "delivery type" {
        Delivery => "delivery",
        Pickup => "pickup",
    }
}

text_enum! {
    CakeType, "cake type" {
        Cream => "cream",
        Fondant => "fondant",
        SemiFondant => "semi-fondant",
        Other => "other",
    }
}

/// Parse an optional yes/no form field.
///
/// Blank input means "not specified".
///
/// # Errors
///
/// Returns [`ParseEnumError`] for anything other than yes/no, true/false,
/// on/off (any case) or blank.
pub fn parse_yes_no(kind: &'static str, raw: &str) -> Result<Option<bool>, ParseEnumError> {
    match raw.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "yes" | "true" | "on" => Ok(Some(true)),
        "no" | "false" | "off" => Ok(Some(false)),
        _ => Err(ParseEnumError::new(kind, raw)),
    }
}

/// One uploaded cake order: the photographed slip plus delivery metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slip {
    pub id: SlipId,
    pub branch: Branch,
    /// Stored text, `YYYY-MM-DD` for everything written by this service.
    pub delivery_date: String,
    /// Free-form display text such as "3 PM".
    pub delivery_time: String,
    pub delivery_type: DeliveryType,
    pub cake_type: CakeType,
    pub customer_name: String,
    pub customer_number: String,
    pub bill_number: String,
    pub hamper: Option<bool>,
    pub topper: Option<bool>,
    pub image_url: String,
    pub status: SlipStatus,
    pub created_at: DateTime<Utc>,
}
