pub mod health;
pub mod home;
pub mod reminders;

use axum::{http::StatusCode, Json};
use serde::Serialize;
use smartreminder_scheduler::SchedulerError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Map an engine error to its HTTP status and JSON body.
pub fn api_error(err: SchedulerError) -> ApiError {
    let status = match err {
        SchedulerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SchedulerError::Conflict { .. } | SchedulerError::DuplicateId { .. } => {
            StatusCode::CONFLICT
        }
        SchedulerError::NotFound { .. } => StatusCode::NOT_FOUND,
        SchedulerError::Notify(_)
        | SchedulerError::WatcherAlreadyRunning
        | SchedulerError::ShutdownTimeout { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
            code: err.code(),
        }),
    )
}
