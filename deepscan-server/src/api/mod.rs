//! API Module
//!
//! HTTP API layer of the scan server.
//! Each submodule handles endpoints for a specific concern.

pub mod error;
pub mod events;
pub mod health;
pub mod scan;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Scan submission
        .route("/package", post(scan::scan_package))
        // Progress for the web UI
        .route("/notifications", get(events::notifications))
        .route("/violations", get(events::violations))
        .route("/snapshot", get(events::snapshot))
        .route("/clear", get(events::clear))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
