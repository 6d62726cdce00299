use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::TimeChangeRequest;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::time_request_service::{ChangeTimeRequest, Submitter};

fn submitter(user: &AuthUser) -> Submitter<'_> {
    Submitter {
        staff_id: &user.staff_id,
        is_personnel: user.is_personnel(),
    }
}

/// POST /api/requests/time-change - File a time-change request
///
/// Expected Input:
/// ```json
/// {
///   "staffID": "25001",          // optional, defaults to the caller
///   "date": "2025-03-14",
///   "h1": 8, "m1": 30, "h2": 17, "m2": 0,
///   "wrkType": "Office",
///   "off": null,
///   "reason": "string",
///   "evidence": "data:image/png;base64,..."
/// }
/// ```
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChangeTimeRequest>,
) -> ApiResult<TimeChangeRequest> {
    let stored = state.time_requests.submit(submitter(&user), payload).await?;
    Ok(ApiResponse::created(stored))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "staffID")]
    pub staff_id: Option<String>,
}

/// GET /api/requests/time-change[?staffID=] - List time-change requests
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<TimeChangeRequest>> {
    let requests = state
        .time_requests
        .list(submitter(&user), query.staff_id.as_deref())
        .await?;
    Ok(ApiResponse::success(requests))
}
