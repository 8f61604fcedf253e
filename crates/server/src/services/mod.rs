//! Business logic services.
//!
//! # Services
//!
//! - `slips` - Listing, creation with image upload, role-gated status changes
//! - `retention` - Retention sweep and its daily scheduler
//! - `auth` - Password registration and login
//! - `users` - Admin user management

pub mod auth;
pub mod retention;
pub mod slips;
pub mod users;

pub use auth::{AuthError, AuthService};
pub use retention::{RetentionScheduler, RetentionSweeper, SchedulerOutcome, SweepReport};
pub use slips::{SlipError, SlipService};
pub use users::{UserAdminError, UserAdminService, UserUpdate};
