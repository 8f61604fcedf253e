//! Retention window rules.
//!
//! A slip becomes eligible for deletion once its delivery date is strictly
//! earlier than `today - retention_days`. Slips whose delivery date cannot be
//! parsed are never eligible.

use chrono::{Days, NaiveDate};

use crate::types::{Slip, parse_delivery_date};

/// First delivery date that is still kept.
///
/// Saturates at [`NaiveDate::MIN`] for absurdly large windows.
#[must_use]
pub fn cutoff_date(today: NaiveDate, retention_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(retention_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Whether `slip` falls outside the retention window.
#[must_use]
pub fn is_expired(slip: &Slip, cutoff: NaiveDate) -> bool {
    parse_delivery_date(&slip.delivery_date).is_some_and(|date| date < cutoff)
}

/// Slips to delete for the given cutoff, in input order.
#[must_use]
pub fn select_expired(slips: &[Slip], cutoff: NaiveDate) -> Vec<&Slip> {
    slips.iter().filter(|s| is_expired(s, cutoff)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::types::{Branch, CakeType, DeliveryType, SlipId, SlipStatus};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slip(id: i32, date: &str) -> Slip {
        Slip {
            id: SlipId::new(id),
            branch: Branch::Khamla,
            delivery_date: date.to_string(),
            delivery_time: "5 PM".to_string(),
            delivery_type: DeliveryType::Pickup,
            cake_type: CakeType::Cream,
            customer_name: "Ravi".to_string(),
            customer_number: "9000000000".to_string(),
            bill_number: format!("B{id}"),
            hamper: None,
            topper: None,
            image_url: String::new(),
            status: SlipStatus::Delivered,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_cutoff_subtracts_days() {
        assert_eq!(cutoff_date(ymd(2024, 2, 1), 5), ymd(2024, 1, 27));
        assert_eq!(cutoff_date(ymd(2024, 3, 1), 0), ymd(2024, 3, 1));
        assert_eq!(cutoff_date(ymd(2024, 3, 1), u32::MAX), NaiveDate::MIN);
    }

    #[test]
    fn test_only_strictly_older_slips_expire() {
        let cutoff = ymd(2024, 1, 27);
        let slips = vec![
            slip(1, "2024-01-26"),
            slip(2, "2024-01-27"),
            slip(3, "2024-01-28"),
        ];
        let expired: Vec<i32> = select_expired(&slips, cutoff)
            .iter()
            .map(|s| s.id.as_i32())
            .collect();
        assert_eq!(expired, vec![1]);
    }

    #[test]
    fn test_legacy_format_is_understood() {
        assert!(is_expired(&slip(1, "01-01-2024"), ymd(2024, 1, 27)));
    }

    #[test]
    fn test_unparseable_dates_never_expire() {
        let cutoff = ymd(2099, 1, 1);
        assert!(!is_expired(&slip(1, "01-01"), cutoff));
        assert!(!is_expired(&slip(2, "long ago"), cutoff));
        assert!(!is_expired(&slip(3, ""), cutoff));
        assert!(!is_expired(&slip(4, "31-02-2024"), cutoff));
    }
}
