//! Domain models for the server.
//!
//! Types that live only at the service/HTTP layer. Shared slip and role
//! types come from `slipdesk_core`.

pub mod session;
pub mod slip_form;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use slip_form::{SlipForm, SlipFormError};
pub use user::User;
