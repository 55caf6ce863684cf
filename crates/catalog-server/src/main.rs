//! Product Catalog Server
//!
//! Lists, creates and deletes catalog products over a small REST API. MySQL
//! is the source of truth when reachable; a JSON snapshot on disk keeps
//! serving (and accepting) records when it is not.

mod error;
mod handlers;
mod services;
mod storage;
mod types;

use anyhow::{Context, Result};
use axum::{
    routing::{delete, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use services::CatalogService;
use storage::{BackupStore, Database};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config();
    info!(
        "Config loaded: bind={}, db={}@{}/{}, backup={}",
        config.bind_address, config.db_user, config.db_host, config.db_name, config.backup_path
    );

    // The pool is lazy, so a down database never blocks startup; the probe
    // below is purely diagnostic.
    let db = Arc::new(Database::connect_lazy(&config));
    db.health_check().await;
    if let Err(e) = db.ensure_schema().await {
        warn!("Schema setup deferred, database unreachable: {e}");
    }

    let backup = Arc::new(BackupStore::new(&config.backup_path));
    let catalog = Arc::new(CatalogService::new(db, backup));

    let state = AppState { catalog };

    info!("Building HTTP router...");
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/produtos",
            get(handlers::products::list).post(handlers::products::create),
        )
        .route("/produtos/:id", delete(handlers::products::delete))
        // Browser-friendly delete, kept from the legacy API surface
        .route("/deletar/:id", get(handlers::products::delete_browser))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub pool_size: u32,
    pub bind_address: String,
    pub backup_path: String,
}

fn load_config() -> Config {
    Config {
        db_host: env_or("DB_HOST", "localhost"),
        db_user: env_or("DB_USER", "root"),
        db_password: env_or("DB_PASSWORD", ""),
        db_name: env_or("DB_NAME", "web_03mc"),
        pool_size: std::env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10),
        bind_address: env_or("BIND_ADDRESS", "0.0.0.0:3000"),
        backup_path: env_or("BACKUP_PATH", "produtos_backup.json"),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
