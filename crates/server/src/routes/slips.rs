//! Slip route handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch},
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use slipdesk_core::{Role, Slip, SlipFilter, SlipId, SlipStatus};

use crate::error::AppError;
use crate::images::ImageUpload;
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth};
use crate::models::SlipForm;
use crate::services::SweepReport;
use crate::state::AppState;

/// Largest accepted upload body (photo plus fields).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the slip photo.
const IMAGE_FIELD: &str = "slip";

/// Build the slips router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/slips",
            get(list_slips)
                .post(create_slip)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/slips/statuses", get(permitted_statuses))
        .route("/api/slips/{id}/status", patch(set_status))
        .route("/api/slips/old", delete(sweep_old_slips))
}

/// List slips, newest first, narrowed by query parameters.
///
/// GET /api/slips?branch=&deliveryType=&cakeType=&date=&q=
async fn list_slips(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<SlipFilter>,
) -> Result<Json<Vec<Slip>>, AppError> {
    Ok(Json(state.slips().list_slips(&filter).await?))
}

/// Upload a slip photo with its order details.
///
/// POST /api/slips (multipart: `slip` file plus text fields)
async fn create_slip(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Slip>), AppError> {
    let mut form = SlipForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            let filename = field.file_name().unwrap_or("slip").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("could not read slip image: {e}")))?;
            image = Some(ImageUpload {
                bytes: bytes.to_vec(),
                filename,
                content_type,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("could not read field {name}: {e}")))?;
            form.set(&name, value);
        }
    }

    let slip = state.slips().create_slip(&form, image).await?;
    Ok((StatusCode::CREATED, Json(slip)))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Change a slip's status.
///
/// PATCH /api/slips/{id}/status `{ "status": "ready" }`
async fn set_status(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Slip>, AppError> {
    let id: SlipId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid slip id: {id}")))?;
    let slip = state
        .slips()
        .set_slip_status(id, &body.status, Some(user.role))
        .await?;
    Ok(Json(slip))
}

#[derive(Debug, Serialize)]
pub struct PermittedStatuses {
    pub role: Option<Role>,
    pub statuses: &'static [SlipStatus],
}

/// Statuses the caller's role may set. Empty when signed out.
///
/// GET /api/slips/statuses
async fn permitted_statuses(OptionalAuth(user): OptionalAuth) -> Json<PermittedStatuses> {
    let role = user.map(|u| u.role);
    Json(PermittedStatuses {
        role,
        statuses: role.map_or(&[] as &[SlipStatus], Role::permitted_statuses),
    })
}

#[derive(Debug, Deserialize)]
pub struct SweepQuery {
    pub days: Option<u32>,
}

/// Run the retention sweep now.
///
/// DELETE /api/slips/old?days=5
async fn sweep_old_slips(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SweepQuery>,
) -> Result<Json<SweepReport>, AppError> {
    let days = query.days.unwrap_or(state.retention().days);
    tracing::info!(admin_id = %admin.id, days, "Manual retention sweep requested");
    let report = state
        .sweeper()
        .sweep(days, Local::now().date_naive())
        .await?;
    Ok(Json(report))
}
