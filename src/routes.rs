// HTTP health surface: same state the health file mirrors, for probes that prefer HTTP.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Router, extract::State, routing::get};
use tower_http::trace::TraceLayer;

use crate::health::HealthHandle;
use crate::models::HealthStatus;

pub fn app(health: HealthHandle) -> Router {
    Router::new()
        .route("/health", get(health_handler)) // GET /health
        .route("/version", get(version_handler)) // GET /version
        .layer(TraceLayer::new_for_http())
        .with_state(health)
}

/// GET /health: 200 "OK", 503 "FAIL", or 503 "PENDING" before the first cycle completes.
async fn health_handler(State(health): State<HealthHandle>) -> impl IntoResponse {
    match health.status() {
        Some(HealthStatus::Ok) => (StatusCode::OK, HealthStatus::Ok.as_str()),
        Some(HealthStatus::Fail) => (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Fail.as_str()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "PENDING"),
    }
}

/// GET /version: service name and version (from Cargo.toml at build time).
async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
