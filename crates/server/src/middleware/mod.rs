//! HTTP middleware and extractors.
//!
//! - `session` - `PostgreSQL`-backed session layer
//! - `auth` - Extractors requiring a signed-in user or an admin

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer_for_store};
