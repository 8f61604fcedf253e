//! Slipdesk server library.
//!
//! The HTTP API, stores and services behind the `slipdesk-server` binary,
//! exposed as a library so the CLI and the integration tests can reuse them.
//!
//! # Layout
//!
//! - `db` - `PostgreSQL` stores behind the `SlipStore`, `UserStore` and
//!   `SettingsStore` traits
//! - `images` - Remote image store for slip photos
//! - `services` - Slip workflows, retention sweep, auth, user admin
//! - `routes` / `middleware` - axum handlers, session and auth extractors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
