use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health — liveness probe with engine counters.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let watcher = *state.watcher_state.borrow();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "watcher": watcher.to_string(),
        "poll_interval_secs": state.config.scheduler.poll_interval_secs,
        "timezone": state.reminders.zone().name(),
        "pending": state.reminders.pending(),
        "fired_total": state.delivered_total(),
    }))
}
