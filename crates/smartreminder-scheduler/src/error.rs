use smartreminder_core::ReminderId;
use thiserror::Error;

/// Errors that can occur within the reminder engine.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Input rejected before the store was touched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A reminder with this ID is already pending.
    #[error("Reminder ID {id} already exists. Use a unique ID.")]
    Conflict { id: ReminderId },

    /// No pending reminder with the given ID.
    #[error("Reminder ID {id} not found.")]
    NotFound { id: ReminderId },

    /// Store-level uniqueness violation on insert.
    #[error("Duplicate reminder id: {id}")]
    DuplicateId { id: ReminderId },

    /// A notifier could not deliver a firing.
    #[error("Notification failed: {0}")]
    Notify(String),

    /// Only one watcher may be attached to a store at a time.
    #[error("A trigger watcher is already running against this store")]
    WatcherAlreadyRunning,

    /// The watcher did not reach `Stopped` within the shutdown bound.
    #[error("Trigger watcher did not stop within {ms}ms")]
    ShutdownTimeout { ms: u64 },
}

impl SchedulerError {
    /// Short error code string returned to HTTP clients.
    pub fn code(&self) -> &'static str {
        match self {
            SchedulerError::Validation(_) => "VALIDATION_ERROR",
            SchedulerError::Conflict { .. } => "CONFLICT",
            SchedulerError::NotFound { .. } => "NOT_FOUND",
            SchedulerError::DuplicateId { .. } => "DUPLICATE_ID",
            SchedulerError::Notify(_) => "NOTIFY_FAILED",
            SchedulerError::WatcherAlreadyRunning => "WATCHER_ALREADY_RUNNING",
            SchedulerError::ShutdownTimeout { .. } => "SHUTDOWN_TIMEOUT",
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
