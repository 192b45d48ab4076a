//! Health check endpoint

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health
/// Liveness probe, also telling whether a scan currently holds the queue
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let scanning = state.queue.try_lock().is_err();
    Json(json!({ "status": "ok", "scanning": scanning }))
}
