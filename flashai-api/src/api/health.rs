//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use flashai_common::api::HealthResponse;

use crate::AppState;

/// GET /health
///
/// Liveness only; does not contact the model provider.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "flashai-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
