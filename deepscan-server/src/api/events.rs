//! Progress API Handlers
//!
//! The web UI polls these endpoints. Each SSE response carries exactly one
//! event with the latest rendering of the log and then ends; the client
//! reconnects to get the next one.

use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use deepscan_core::domain::log::ScanLog;
use deepscan_runner::LogSink;

use crate::state::AppState;

/// Event carrying the rendered task list
pub const PROCESS_UPDATE_EVENT: &str = "process-update";

/// Event carrying the rendered violation list
pub const VIOLATIONS_UPDATE_EVENT: &str = "violations-update";

/// GET /notifications
pub async fn notifications(State(state): State<AppState>) -> Response {
    sse_event(PROCESS_UPDATE_EVENT, &state.sink.snapshot_tasks())
}

/// GET /violations
pub async fn violations(State(state): State<AppState>) -> Response {
    sse_event(VIOLATIONS_UPDATE_EVENT, &state.sink.snapshot_violations())
}

/// GET /snapshot
/// Structured copy of the log
pub async fn snapshot(State(state): State<AppState>) -> Json<ScanLog> {
    Json(state.sink.snapshot())
}

/// GET /clear
pub async fn clear(State(state): State<AppState>) -> &'static str {
    state.sink.reset();
    tracing::debug!("Scan log cleared");
    "Messages cleared"
}

fn sse_event(event: &str, data: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        format_event(chrono::Utc::now().timestamp_millis(), event, data),
    )
        .into_response()
}

/// Encodes one server-sent event
///
/// Every line of `data` becomes its own `data:` field.
pub fn format_event(id: i64, event: &str, data: &str) -> String {
    let mut frame = format!("id: {}\nevent: {}\n", id, event);
    if data.is_empty() {
        frame.push_str("data: \n");
    }
    for line in data.lines() {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}
