//! Item Catalog Server
//!
//! HTTP CRUD service for catalog items. PostgreSQL (or embedded SQLite) is the
//! system of record; Redis (or an in-process map) fronts it as a read-through
//! cache.

mod config;
mod handlers;
mod lifecycle;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::ServerConfig;
use crate::lifecycle::Lifecycle;
use crate::services::ItemService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<ItemService>,
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
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Item Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    info!("Loading configuration...");
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, db={}, cache={:?}",
        config.bind_address,
        storage::redact_url(&config.database_url),
        config.cache_backend
    );

    // Connections opened by a partial startup are still closed on the way out.
    let mut lifecycle = Lifecycle::new();
    let result = serve(&config, &mut lifecycle).await;
    lifecycle.shutdown().await;
    result
}

async fn serve(config: &ServerConfig, lifecycle: &mut Lifecycle) -> Result<()> {
    let items = lifecycle.start(config).await?;
    let state = AppState {
        items: Arc::new(items),
    };

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped accepting connections");
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(item_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            get(handlers::items::list).post(handlers::items::create),
        )
        .route(
            "/items/:id",
            get(handlers::items::get)
                .put(handlers::items::update)
                .delete(handlers::items::delete),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
