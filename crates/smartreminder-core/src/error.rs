use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid timestamp '{raw}': {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
}

impl CoreError {
    /// Short error code string returned to HTTP clients.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Config(_) => "CONFIG_ERROR",
            CoreError::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
            CoreError::UnknownTimeZone(_) => "UNKNOWN_TIME_ZONE",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
