//! Reminder CRUD endpoints.
//!
//! ```text
//! POST   /reminders        {"id":1,"title":"..","message":"..","remind_at":"2030-01-01T09:00:00Z"}
//! GET    /reminders
//! GET    /reminders/{id}
//! DELETE /reminders/{id}
//! ```
//!
//! `remind_at` without an offset is read in the configured reference zone.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use smartreminder_core::{NewReminder, Reminder, ReminderId};
use std::sync::Arc;
use tracing::debug;

use super::{api_error, ApiError};
use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteReply {
    pub status: &'static str,
    pub message: String,
}

/// POST /reminders — schedule a new reminder.
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewReminder>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let reminder = state.reminders.create(req).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// GET /reminders — pending reminders in creation order.
pub async fn list_reminders(State(state): State<Arc<AppState>>) -> Json<Vec<Reminder>> {
    let reminders = state.reminders.list();
    debug!(count = reminders.len(), "listed reminders");
    Json(reminders)
}

/// GET /reminders/{id}
pub async fn get_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Reminder>, ApiError> {
    state
        .reminders
        .get(ReminderId(id))
        .map(Json)
        .map_err(api_error)
}

/// DELETE /reminders/{id} — cancel a pending reminder.
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteReply>, ApiError> {
    let removed = state
        .reminders
        .delete(ReminderId(id))
        .map_err(api_error)?;
    Ok(Json(DeleteReply {
        status: "success",
        message: format!("Reminder '{}' deleted successfully.", removed.title),
    }))
}
