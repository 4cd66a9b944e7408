use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answers, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the media store is reachable.
    pub storage_healthy: bool,
}

/// GET /health -- returns service, database and media store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, storage) = tokio::join!(
        castlane_db::health_check(&state.pool),
        state.media.health_check()
    );
    let db_healthy = db.is_ok();
    let storage_healthy = storage.is_ok();

    if let Err(e) = &storage {
        tracing::warn!(error = %e, "Media store health check failed");
    }

    let status = if db_healthy && storage_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
