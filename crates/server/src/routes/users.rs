//! Admin user management route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use slipdesk_core::{Role, UserId};

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::UserUpdate;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", put(update_user).delete(delete_user))
}

/// Partial user edit. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid user id: {raw}")))
}

/// GET /api/users
async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users().list_users().await?))
}

/// PUT /api/users/{id}
async fn update_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let id = parse_user_id(&id)?;
    let user = state
        .users()
        .update_user(
            id,
            UserUpdate {
                username: body.username,
                email: body.email,
                role: body.role,
            },
        )
        .await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id}
async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_user_id(&id)?;
    state.users().delete_user(admin.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
