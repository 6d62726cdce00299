use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::AuthOutcome;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// PUT /api/auth/password - Change the caller's own password
///
/// Expected Input:
/// ```json
/// { "oldPassword": "string", "newPassword": "string" }
/// ```
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Value> {
    let outcome = state
        .accounts
        .change_password(&user.staff_id, &payload.old_password, &payload.new_password)
        .await?;

    match outcome {
        AuthOutcome::Success(()) => Ok(ApiResponse::success(json!({ "changed": true }))),
        AuthOutcome::NotFound => Err(ApiError::not_found("User not found")),
        AuthOutcome::InvalidCredential => Err(ApiError::unauthorized("Password verification failed")),
    }
}
