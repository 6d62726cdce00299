use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use staff_management_api::{
    app::{app, AppState},
    config::{self, StoreBackend},
    database::{DatabaseManager, MemoryStore, PgStore, Store},
    is_production,
    services::{CloudinaryUploader, DisabledUploader, ImageUploader, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Staff Management API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set outside development");
    }

    let store: Arc<dyn Store> = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect_lazy(&config.database)
                .context("invalid database configuration")?;
            let store = PgStore::new(pool);
            if let Err(e) = store.migrate().await {
                // The server still starts; /health reports the outage
                tracing::error!("Schema migration failed: {}", e);
            }
            Arc::new(store)
        }
        StoreBackend::Memory => {
            if is_production!() {
                bail!("the in-memory store is not allowed in production");
            }
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let uploader: Arc<dyn ImageUploader> = match config.upload.cloudinary_url.as_deref() {
        Some(url) => Arc::new(CloudinaryUploader::from_url(url).context("invalid CLOUDINARY_URL")?),
        None => {
            tracing::info!("CLOUDINARY_URL not set; image uploads are disabled");
            Arc::new(DisabledUploader)
        }
    };

    let state = AppState::new(Arc::new(config.clone()), store, uploader, Arc::new(SystemClock));

    if let Some(password) = config.security.bootstrap_admin_password.as_deref() {
        if let Err(e) = state.accounts.bootstrap_admin(password).await {
            tracing::error!("Administrator bootstrap failed: {}", e);
        }
    }
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("STAFF_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Staff Management API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
