//! Slipdesk Core - Shared types and pure business rules.
//!
//! This crate provides the domain model used by every Slipdesk component:
//! - `server` - JSON API, retention scheduler and Postgres stores
//! - `cli` - Migrations, user bootstrap and manual sweeps
//!
//! # Architecture
//!
//! The core crate holds no I/O: no database access, no HTTP clients. The
//! status policy, the slip filter and the retention cutoff rules live here so
//! they can be tested without any infrastructure.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, roles, statuses and the slip record
//! - [`filter`] - Slip list filtering and free-text search
//! - [`retention`] - Cutoff computation and expired-slip selection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod retention;
pub mod types;

pub use filter::{SlipFilter, filter_slips};
pub use types::*;
