//! Delivery date parsing.
//!
//! Slips are written with the canonical ISO form `YYYY-MM-DD`. Older rows and
//! some clients use `DD-MM-YYYY`, which is still accepted on input. Anything
//! without a year (such as `DD-MM`) cannot be placed on a calendar and is
//! rejected.

use chrono::NaiveDate;

/// Format every delivery date is stored in.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Legacy day-first format still accepted on input.
pub const LEGACY_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("delivery date is required")]
    Empty,
    #[error("delivery date \"{0}\" must be YYYY-MM-DD or DD-MM-YYYY")]
    Unrecognized(String),
}

/// Parse a stored or submitted delivery date.
///
/// Returns `None` for anything that is not a full calendar date.
#[must_use]
pub fn parse_delivery_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, CANONICAL_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, LEGACY_FORMAT))
        .ok()
}

/// Normalize a submitted delivery date to `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`DateError`] when the input is blank or not a recognized date.
pub fn canonical_delivery_date(raw: &str) -> Result<String, DateError> {
    if raw.trim().is_empty() {
        return Err(DateError::Empty);
    }
    parse_delivery_date(raw)
        .map(|date| date.format(CANONICAL_FORMAT).to_string())
        .ok_or_else(|| DateError::Unrecognized(raw.trim().to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parses_both_formats() {
        assert_eq!(parse_delivery_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_delivery_date("05-01-2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_delivery_date(" 31-12-2023 "), Some(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_rejects_yearless_and_garbage() {
        assert_eq!(parse_delivery_date("05-01"), None);
        assert_eq!(parse_delivery_date("31-02-2024"), None);
        assert_eq!(parse_delivery_date("tomorrow"), None);
        assert_eq!(parse_delivery_date(""), None);
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(canonical_delivery_date("07-03-2025").unwrap(), "2025-03-07");
        assert_eq!(canonical_delivery_date("2025-03-07").unwrap(), "2025-03-07");
        assert_eq!(canonical_delivery_date("  "), Err(DateError::Empty));
        assert!(matches!(
            canonical_delivery_date("07-03"),
            Err(DateError::Unrecognized(_))
        ));
    }
}
