//! Authentication route handlers.
//!
//! Password registration and sign-in. The signed-in user is kept in the
//! server-side session.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or username.
    #[serde(alias = "email", alias = "username")]
    pub login: String,
    pub password: String,
}

/// Create a staff account and sign it in.
///
/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state
        .auth()
        .register(&body.username, &body.email, &body.password)
        .await?;
    set_current_user(&session, &CurrentUser::from(&user)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Sign in with email or username.
///
/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = state.auth().login(&body.login, &body.password).await?;
    set_current_user(&session, &CurrentUser::from(&user)).await?;
    Ok(Json(user))
}

/// Sign out.
///
/// POST /api/auth/logout
async fn logout(session: Session) -> Result<StatusCode, AppError> {
    clear_current_user(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user, as currently stored.
///
/// GET /api/auth/me
async fn me(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<User>, AppError> {
    if let Some(user) = state.auth().me(current.id).await? {
        return Ok(Json(user));
    }
    clear_current_user(&session).await?;
    Err(AppError::Unauthorized("account no longer exists".to_string()))
}
