//! HTTP request handlers

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json};
use fakemetrics_registry::Registry;
use serde::Serialize;
use std::sync::Arc;

/// Content type for the Prometheus text exposition format.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Application state shared across handlers
pub struct AppState {
    pub registry: Arc<Registry>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Scrape handler, renders every registered metric in exposition format
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut body = String::new();
    state.registry.write_prometheus(&mut body);
    ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body)
}
