//! Health check handler

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    storage: &'static str,
    cache: &'static str,
}

fn up_down(ok: bool) -> &'static str {
    if ok {
        "up"
    } else {
        "down"
    }
}

/// Storage must answer for the service to be healthy. A cache outage only
/// shows up in the body.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage_ok = match state.items.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check: storage unreachable: {}", e);
            false
        }
    };
    let cache_ok = match state.items.cache().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check: cache unreachable: {}", e);
            false
        }
    };

    let (code, status) = if storage_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            storage: up_down(storage_ok),
            cache: up_down(cache_ok),
        }),
    )
}
