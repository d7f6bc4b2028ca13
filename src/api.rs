//! Status HTTP surface
//!
//! Read-only observation endpoints for operators and fleet monitoring.
//! Nothing here can mutate playback state.

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::{SharedState, StatusSnapshot};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub shared: SharedState,
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "signloop",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
    }))
}

/// Current playback and update-check status
async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.shared.snapshot().await)
}
