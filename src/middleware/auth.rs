use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{Claims, TokenIssuer};
use crate::error::ApiError;
use crate::types::AppRole;

/// Authenticated caller extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub staff_id: String,
    pub roles: Vec<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            staff_id: claims.sub,
            roles: claims.roles,
        }
    }
}

impl AuthUser {
    pub fn has_role(&self, role: AppRole) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }

    pub fn has_any_role(&self, roles: &[AppRole]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    /// May act on staff records other than their own
    pub fn is_personnel(&self) -> bool {
        self.has_any_role(&AppRole::PERSONNEL)
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = state.tokens.verify(&token).map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        ApiError::unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Caller on a public route that also accepts a token. No Authorization
/// header means anonymous; a header that fails verification is rejected.
pub fn optional_auth_user(tokens: &TokenIssuer, headers: &HeaderMap) -> Result<Option<AuthUser>, ApiError> {
    if !headers.contains_key(axum::http::header::AUTHORIZATION) {
        return Ok(None);
    }

    let token = extract_jwt_from_headers(headers).map_err(ApiError::unauthorized)?;
    let claims = tokens
        .verify(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;
    Ok(Some(AuthUser::from(claims)))
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
