//! Shared types, configuration and time handling for SmartReminder.

pub mod config;
pub mod error;
pub mod time;
pub mod types;

pub use error::{CoreError, Result};
pub use time::{normalize_timestamp, Clock, ManualClock, SystemClock};
pub use types::{Firing, NewReminder, Reminder, ReminderId};
