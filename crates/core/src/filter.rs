//! Slip list filtering and free-text search.
//!
//! Every active criterion must match (logical AND). Enumerated criteria treat
//! a blank value or `"all"` as "no constraint", so the raw values of a filter
//! form's select boxes can be passed straight through.

use serde::Deserialize;

use crate::types::{Slip, parse_delivery_date};

/// Criteria for narrowing a slip list. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlipFilter {
    pub branch: Option<String>,
    pub delivery_type: Option<String>,
    pub cake_type: Option<String>,
    /// Exact delivery date, in either accepted date format.
    pub date: Option<String>,
    /// Free-text search over branch, type, date, customer and bill fields.
    #[serde(alias = "q", alias = "search")]
    pub query: Option<String>,
}

impl SlipFilter {
    /// True when no criterion constrains the result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        enum_criterion(self.branch.as_deref()).is_none()
            && enum_criterion(self.delivery_type.as_deref()).is_none()
            && enum_criterion(self.cake_type.as_deref()).is_none()
            && text_criterion(self.date.as_deref()).is_none()
            && text_criterion(self.query.as_deref()).is_none()
    }

    #[must_use]
    pub fn matches(&self, slip: &Slip) -> bool {
        enum_matches(self.branch.as_deref(), slip.branch.as_str())
            && enum_matches(self.delivery_type.as_deref(), slip.delivery_type.as_str())
            && enum_matches(self.cake_type.as_deref(), slip.cake_type.as_str())
            && date_matches(self.date.as_deref(), &slip.delivery_date)
            && query_matches(self.query.as_deref(), slip)
    }
}

/// Keep the slips matching `filter`, preserving their order.
#[must_use]
pub fn filter_slips(slips: Vec<Slip>, filter: &SlipFilter) -> Vec<Slip> {
    if filter.is_empty() {
        return slips;
    }
    slips.into_iter().filter(|s| filter.matches(s)).collect()
}

fn text_criterion(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn enum_criterion(value: Option<&str>) -> Option<&str> {
    text_criterion(value).filter(|v| !v.eq_ignore_ascii_case("all"))
}

fn enum_matches(criterion: Option<&str>, value: &str) -> bool {
    enum_criterion(criterion).is_none_or(|c| c.eq_ignore_ascii_case(value))
}

fn date_matches(criterion: Option<&str>, stored: &str) -> bool {
    let Some(wanted) = text_criterion(criterion) else {
        return true;
    };
    match (parse_delivery_date(wanted), parse_delivery_date(stored)) {
        (Some(wanted), Some(stored)) => wanted == stored,
        _ => wanted == stored.trim(),
    }
}

fn query_matches(criterion: Option<&str>, slip: &Slip) -> bool {
    let Some(needle) = text_criterion(criterion) else {
        return true;
    };
    let needle = needle.to_lowercase();
    [
        slip.branch.as_str(),
        slip.delivery_type.as_str(),
        slip.delivery_date.as_str(),
        slip.customer_name.as_str(),
        slip.customer_number.as_str(),
        slip.bill_number.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::types::{Branch, CakeType, DeliveryType, SlipId, SlipStatus};

    fn slip(id: i32, branch: Branch, kind: DeliveryType, cake: CakeType, date: &str) -> Slip {
        Slip {
            id: SlipId::new(id),
            branch,
            delivery_date: date.to_string(),
            delivery_time: "11 AM".to_string(),
            delivery_type: kind,
            cake_type: cake,
            customer_name: format!("Customer {id}"),
            customer_number: format!("98{id:08}"),
            bill_number: format!("BILL-{id}"),
            hamper: None,
            topper: None,
            image_url: format!("https://img.example/{id}.webp"),
            status: SlipStatus::Pending,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn sample() -> Vec<Slip> {
        vec![
            slip(1, Branch::Khamla, DeliveryType::Delivery, CakeType::Cream, "2024-03-01"),
            slip(2, Branch::Sakkardara, DeliveryType::Pickup, CakeType::Fondant, "2024-03-01"),
            slip(3, Branch::Khamla, DeliveryType::Pickup, CakeType::SemiFondant, "2024-03-02"),
            slip(4, Branch::Dharampeth, DeliveryType::Delivery, CakeType::Other, "02-03-2024"),
            slip(5, Branch::Khamla, DeliveryType::Delivery, CakeType::Fondant, "02-03"),
        ]
    }

    fn ids(slips: &[Slip]) -> Vec<i32> {
        slips.iter().map(|s| s.id.as_i32()).collect()
    }

    #[test]
    fn test_empty_filter_returns_input_unchanged() {
        let all = sample();
        assert_eq!(filter_slips(all.clone(), &SlipFilter::default()), all);
    }

    #[test]
    fn test_all_is_pass_through() {
        let filter = SlipFilter {
            branch: Some("ALL".to_string()),
            delivery_type: Some("all".to_string()),
            cake_type: Some(String::new()),
            ..SlipFilter::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter_slips(sample(), &filter).len(), 5);
    }

    #[test]
    fn test_enum_fields_are_anded() {
        let filter = SlipFilter {
            branch: Some("Khamla".to_string()),
            delivery_type: Some("delivery".to_string()),
            ..SlipFilter::default()
        };
        assert_eq!(ids(&filter_slips(sample(), &filter)), vec![1, 5]);

        let filter = SlipFilter {
            cake_type: Some("FONDANT".to_string()),
            ..filter
        };
        assert_eq!(ids(&filter_slips(sample(), &filter)), vec![5]);
    }

    #[test]
    fn test_criteria_order_does_not_matter() {
        let by_branch = SlipFilter {
            branch: Some("khamla".to_string()),
            ..SlipFilter::default()
        };
        let by_type = SlipFilter {
            delivery_type: Some("pickup".to_string()),
            ..SlipFilter::default()
        };
        let both = SlipFilter {
            branch: by_branch.branch.clone(),
            delivery_type: by_type.delivery_type.clone(),
            ..SlipFilter::default()
        };

        let branch_then_type = filter_slips(filter_slips(sample(), &by_branch), &by_type);
        let type_then_branch = filter_slips(filter_slips(sample(), &by_type), &by_branch);
        assert_eq!(branch_then_type, type_then_branch);
        assert_eq!(branch_then_type, filter_slips(sample(), &both));
        assert_eq!(ids(&branch_then_type), vec![3]);
    }

    #[test]
    fn test_date_matches_across_formats() {
        let filter = SlipFilter {
            date: Some("02-03-2024".to_string()),
            ..SlipFilter::default()
        };
        assert_eq!(ids(&filter_slips(sample(), &filter)), vec![3, 4]);

        let filter = SlipFilter {
            date: Some("2024-03-02".to_string()),
            ..SlipFilter::default()
        };
        assert_eq!(ids(&filter_slips(sample(), &filter)), vec![3, 4]);
    }

    #[test]
    fn test_unparseable_dates_compare_as_text() {
        let filter = SlipFilter {
            date: Some("02-03".to_string()),
            ..SlipFilter::default()
        };
        assert_eq!(ids(&filter_slips(sample(), &filter)), vec![5]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let upper = SlipFilter {
            query: Some("KHAMLA".to_string()),
            ..SlipFilter::default()
        };
        let lower = SlipFilter {
            query: Some("khamla".to_string()),
            ..SlipFilter::default()
        };
        let upper_result = filter_slips(sample(), &upper);
        assert_eq!(upper_result, filter_slips(sample(), &lower));
        assert_eq!(ids(&upper_result), vec![1, 3, 5]);
    }

    #[test]
    fn test_query_searches_customer_and_bill_fields() {
        let by_bill = SlipFilter {
            query: Some("bill-4".to_string()),
            ..SlipFilter::default()
        };
        assert_eq!(ids(&filter_slips(sample(), &by_bill)), vec![4]);

        let by_number = SlipFilter {
            query: Some("9800000002".to_string()),
            ..SlipFilter::default()
        };
        assert_eq!(ids(&filter_slips(sample(), &by_number)), vec![2]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let filter = SlipFilter {
            branch: Some("sakkardara".to_string()),
            delivery_type: Some("delivery".to_string()),
            ..SlipFilter::default()
        };
        assert!(filter_slips(sample(), &filter).is_empty());
    }

    #[test]
    fn test_deserializes_from_query_names() {
        let filter: SlipFilter =
            serde_json::from_str(r#"{"branch":"khamla","deliveryType":"pickup","q":"asha"}"#)
                .unwrap();
        assert_eq!(filter.branch.as_deref(), Some("khamla"));
        assert_eq!(filter.delivery_type.as_deref(), Some("pickup"));
        assert_eq!(filter.query.as_deref(), Some("asha"));
    }
}
