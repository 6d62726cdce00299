use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::Staff;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/staff - All staff records, ordered by staff id
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Staff>> {
    let staff = state.store.list_staff().await?;
    Ok(ApiResponse::success(staff))
}

/// GET /api/staff/:id
pub async fn get(State(state): State<AppState>, Path(staff_id): Path<String>) -> ApiResult<Staff> {
    state
        .store
        .get_staff(&staff_id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Staff {} not found", staff_id)))
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    /// Base64 image or data URL
    pub image: String,
}

/// PUT /api/staff/:id/avatar - Upload a new avatar
///
/// Allowed for the staff member themself and for personnel roles.
pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(staff_id): Path<String>,
    Json(payload): Json<AvatarRequest>,
) -> ApiResult<Staff> {
    if user.staff_id != staff_id && !user.is_personnel() {
        return Err(ApiError::forbidden("Cannot change another staff member's avatar"));
    }
    if state.store.get_staff(&staff_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Staff {} not found", staff_id)));
    }

    let file_name = format!("{}_avatar", staff_id);
    let url = state
        .images
        .upload_image(&file_name, &payload.image)
        .await
        .ok_or_else(|| ApiError::bad_request("Avatar image could not be uploaded"))?;

    state
        .store
        .update_avatar(&staff_id, &url)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Staff {} not found", staff_id)))
}
