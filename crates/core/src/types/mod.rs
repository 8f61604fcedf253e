//! Core types for Slipdesk.
//!
//! This module provides type-safe wrappers for the bakery's domain concepts.

pub mod date;
pub mod email;
pub mod id;
pub mod role;
pub mod slip;
pub mod status;

pub use date::{DateError, canonical_delivery_date, parse_delivery_date};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, StatusChangeDenied, authorize_status_change};
pub use slip::{Branch, CakeType, DeliveryType, ParseEnumError, Slip, parse_yes_no};
pub use status::{OptimisticStatus, SlipStatus};
