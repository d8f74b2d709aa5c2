use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

/// GET / — API root with a usage hint.
pub async fn home_handler() -> Json<Value> {
    debug!("home endpoint accessed");
    Json(json!({
        "status": "ok",
        "message": "Welcome to SmartReminder Notifier",
        "hint": "Use POST /reminders to schedule a reminder.",
    }))
}
