use axum::{extract::State, http::HeaderMap, Json};

use crate::app::AppState;
use crate::database::models::Staff;
use crate::error::ApiError;
use crate::middleware::{optional_auth_user, ApiResponse, ApiResult};
use crate::services::account_service::RegisterRequest;
use crate::services::Registrar;

/// POST /auth/register - Register a staff member and their sign-in account
///
/// The staff id is allocated by the server (`YYNNN`) and returned in the
/// created record; it doubles as the `userID` for sign-in.
///
/// Expected Input:
/// ```json
/// {
///   "fullName": "Ada Lovelace",
///   "password": "string",
///   "roles": "Staff_HRStaff",
///   "divisionID": 1,
///   "managerID": "25001",
///   ...
/// }
/// ```
///
/// Without a token only the `Staff` role may be requested. A bearer token of
/// an Admin, HRManager or HRStaff account may grant any role.
///
/// Disabled (403) unless `SECURITY_ALLOW_REGISTRATION` is set.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Staff> {
    if !state.config.security.allow_registration {
        return Err(ApiError::forbidden(
            "User registration is not available in this environment",
        ));
    }

    let registrar = match optional_auth_user(&state.tokens, &headers)? {
        Some(user) if user.is_personnel() => Registrar::Personnel,
        _ => Registrar::SelfService,
    };

    let staff = state.accounts.register(payload, registrar).await?;
    Ok(ApiResponse::created(staff))
}
