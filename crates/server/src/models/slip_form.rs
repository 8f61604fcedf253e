//! Submitted slip fields and their validation.
//!
//! Multipart uploads arrive as loose text fields. [`SlipForm::validate`]
//! turns them into typed values before any image is uploaded, so a rejected
//! form never leaves an orphaned image behind.

use thiserror::Error;

use slipdesk_core::{
    Branch, CakeType, DateError, DeliveryType, ParseEnumError, canonical_delivery_date,
    parse_yes_no,
};

use crate::db::NewSlip;

/// Raw slip fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlipForm {
    pub branch: Option<String>,
    pub delivery_date: Option<String>,
    pub delivery_time: Option<String>,
    pub delivery_type: Option<String>,
    pub cake_type: Option<String>,
    pub customer_name: Option<String>,
    pub customer_number: Option<String>,
    pub bill_number: Option<String>,
    pub hamper: Option<String>,
    pub topper: Option<String>,
}

/// Why a submitted slip was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlipFormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error(transparent)]
    InvalidValue(#[from] ParseEnumError),

    #[error(transparent)]
    InvalidDate(#[from] DateError),
}

/// Validated slip fields, waiting for the image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlipDraft {
    pub branch: Branch,
    pub delivery_date: String,
    pub delivery_time: String,
    pub delivery_type: DeliveryType,
    pub cake_type: CakeType,
    pub customer_name: String,
    pub customer_number: String,
    pub bill_number: String,
    pub hamper: Option<bool>,
    pub topper: Option<bool>,
}

impl SlipDraft {
    #[must_use]
    pub fn with_image(self, image_url: String) -> NewSlip {
        NewSlip {
            branch: self.branch,
            delivery_date: self.delivery_date,
            delivery_time: self.delivery_time,
            delivery_type: self.delivery_type,
            cake_type: self.cake_type,
            customer_name: self.customer_name,
            customer_number: self.customer_number,
            bill_number: self.bill_number,
            hamper: self.hamper,
            topper: self.topper,
            image_url,
        }
    }
}

fn required(value: Option<&String>, field: &'static str) -> Result<String, SlipFormError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(SlipFormError::Missing(field))
}

impl SlipForm {
    /// Set a field by its multipart name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "branch" => &mut self.branch,
            "deliveryDate" | "delivery_date" => &mut self.delivery_date,
            "deliveryTime" | "delivery_time" => &mut self.delivery_time,
            "deliveryType" | "delivery_type" => &mut self.delivery_type,
            "cakeType" | "cake_type" => &mut self.cake_type,
            "customerName" | "customer_name" => &mut self.customer_name,
            "customerNumber" | "customer_number" => &mut self.customer_number,
            "billNumber" | "bill_number" => &mut self.bill_number,
            "hamper" => &mut self.hamper,
            "topper" => &mut self.topper,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Check every field and normalize the delivery date.
    ///
    /// # Errors
    ///
    /// Returns [`SlipFormError`] for the first missing or invalid field.
    pub fn validate(&self) -> Result<SlipDraft, SlipFormError> {
        let branch = required(self.branch.as_ref(), "branch")?.parse()?;
        let delivery_date = canonical_delivery_date(self.delivery_date.as_deref().unwrap_or(""))?;
        let delivery_time = required(self.delivery_time.as_ref(), "delivery time")?;
        let delivery_type = required(self.delivery_type.as_ref(), "delivery type")?.parse()?;
        let cake_type = required(self.cake_type.as_ref(), "cake type")?.parse()?;
        let customer_name = required(self.customer_name.as_ref(), "customer name")?;
        let customer_number = required(self.customer_number.as_ref(), "customer number")?;
        let bill_number = required(self.bill_number.as_ref(), "bill number")?;
        let hamper = parse_yes_no("hamper", self.hamper.as_deref().unwrap_or(""))?;
        let topper = parse_yes_no("topper", self.topper.as_deref().unwrap_or(""))?;

        Ok(SlipDraft {
            branch,
            delivery_date,
            delivery_time,
            delivery_type,
            cake_type,
            customer_name,
            customer_number,
            bill_number,
            hamper,
            topper,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> SlipForm {
        let mut form = SlipForm::default();
        for (name, value) in [
            ("branch", "Khamla"),
            ("deliveryDate", "01-01-2024"),
            ("deliveryTime", "5 PM"),
            ("deliveryType", "pickup"),
            ("cakeType", "fondant"),
            ("customerName", " Ravi "),
            ("customerNumber", "9000000000"),
            ("billNumber", "B-1"),
            ("hamper", "yes"),
        ] {
            form.set(name, value.to_string());
        }
        form
    }

    #[test]
    fn test_valid_form_normalizes_fields() {
        let draft = complete().validate().unwrap();
        assert_eq!(draft.branch, Branch::Khamla);
        assert_eq!(draft.delivery_date, "2024-01-01");
        assert_eq!(draft.customer_name, "Ravi");
        assert_eq!(draft.hamper, Some(true));
        assert_eq!(draft.topper, None);

        let slip = draft.with_image("https://img.example/a.jpg".to_string());
        assert_eq!(slip.image_url, "https://img.example/a.jpg");
    }

    #[test]
    fn test_blank_required_field_is_missing() {
        let mut form = complete();
        form.set("billNumber", "   ".to_string());
        assert_eq!(
            form.validate().unwrap_err(),
            SlipFormError::Missing("bill number")
        );
    }

    #[test]
    fn test_bad_enum_value_is_rejected() {
        let mut form = complete();
        form.set("cakeType", "sponge".to_string());
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid cake type: \"sponge\"");
    }

    #[test]
    fn test_yearless_date_is_rejected() {
        let mut form = complete();
        form.set("deliveryDate", "01-01".to_string());
        assert!(matches!(
            form.validate().unwrap_err(),
            SlipFormError::InvalidDate(DateError::Unrecognized(_))
        ));

        form.delivery_date = None;
        assert_eq!(
            form.validate().unwrap_err(),
            SlipFormError::InvalidDate(DateError::Empty)
        );
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let mut form = complete();
        form.set("deliveryMonth", "January".to_string());
        assert_eq!(form, complete());
    }
}
