//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (database)
//!
//! # Auth
//! POST   /api/auth/register       - Create a staff account and sign in
//! POST   /api/auth/login          - Sign in with email or username
//! POST   /api/auth/logout         - Sign out
//! GET    /api/auth/me             - Current user
//!
//! # Slips (signed in)
//! GET    /api/slips               - List slips (filter via query parameters)
//! POST   /api/slips               - Upload a slip (multipart)
//! PATCH  /api/slips/{id}/status   - Change status (role-gated)
//! GET    /api/slips/statuses      - Statuses the caller may set (empty when signed out)
//! DELETE /api/slips/old           - Run the retention sweep (admin)
//!
//! # Users (admin)
//! GET    /api/users               - List users
//! PUT    /api/users/{id}          - Edit username, email or role
//! DELETE /api/users/{id}          - Delete a user (not yourself)
//! ```

pub mod auth;
pub mod slips;
pub mod users;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// All routes, without session or tracing layers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::router())
        .merge(slips::router())
        .merge(users::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.slip_store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
