use axum::{extract::State, Json};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service::{SignInRequest, SignInResponse};
use crate::services::AuthOutcome;

/// POST /auth/signin - Authenticate and receive an access token
///
/// Expected Input:
/// ```json
/// { "userID": "25001", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "accessToken": "eyJhbGciOiJIUzI1NiI...",
///     "expiresIn": 604800,
///     "roles": ["Staff"],
///     "staff": { "staffID": "25001", ... }
///   }
/// }
/// ```
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> ApiResult<SignInResponse> {
    match state.accounts.sign_in(payload).await? {
        AuthOutcome::Success(response) => Ok(ApiResponse::success(response)),
        AuthOutcome::NotFound => Err(ApiError::not_found("User not found")),
        AuthOutcome::InvalidCredential => Err(ApiError::unauthorized("Incorrect password")),
    }
}
