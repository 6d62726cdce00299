use axum::Extension;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    #[serde(rename = "staffID")]
    pub staff_id: String,
    pub roles: Vec<String>,
}

/// GET /api/auth/whoami - Identity carried by the caller's token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<WhoAmI> {
    Ok(ApiResponse::success(WhoAmI {
        staff_id: user.staff_id,
        roles: user.roles,
    }))
}
