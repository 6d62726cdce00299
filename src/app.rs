use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::services::{
    AccountService, AccountSettings, Clock, ImageService, ImageUploader, TimeRequestService,
};

/// Shared handler state, assembled once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenIssuer>,
    pub accounts: Arc<AccountService>,
    pub images: ImageService,
    pub time_requests: Arc<TimeRequestService>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn Store>,
        uploader: Arc<dyn ImageUploader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = Arc::new(TokenIssuer::from_config(&config.security));
        let images = ImageService::new(uploader);
        let accounts = Arc::new(AccountService::new(
            store.clone(),
            clock,
            tokens.clone(),
            AccountSettings::from_config(&config),
        ));
        let time_requests = Arc::new(TimeRequestService::new(store.clone(), images.clone()));

        Self {
            config,
            store,
            tokens,
            accounts,
            images,
            time_requests,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if let Some(cors) = cors_layer(&state.config) {
        router = router.layer(cors);
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/signin", post(auth::signin))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, requests, staff};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/password", put(auth::change_password))
        .route("/api/staff", get(staff::list))
        .route("/api/staff/:id", get(staff::get))
        .route("/api/staff/:id/avatar", put(staff::update_avatar))
        .route(
            "/api/requests/time-change",
            post(requests::submit).get(requests::list),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    let origins = &config.security.cors_origins;
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Staff Management API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/signin (public - token acquisition)",
                "auth": "/api/auth/whoami, /api/auth/password (protected)",
                "staff": "/api/staff[/:id[/avatar]] (protected)",
                "requests": "/api/requests/time-change (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
