use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied reminder identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(pub i64);

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ReminderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A pending one-shot reminder. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub title: String,
    pub message: String,
    /// Due instant, always normalized to UTC.
    pub remind_at: DateTime<Utc>,
}

/// Unvalidated create request as received from a client.
///
/// `remind_at` stays a string until validation so that zone-less timestamps
/// can be interpreted in the configured reference zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReminder {
    pub id: ReminderId,
    pub title: String,
    pub message: String,
    pub remind_at: String,
}

/// Notification emitted when the watcher fires a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firing {
    pub id: ReminderId,
    pub title: String,
    pub message: String,
    pub remind_at: DateTime<Utc>,
    pub fired_at: DateTime<Utc>,
}

impl Firing {
    pub fn new(reminder: &Reminder, fired_at: DateTime<Utc>) -> Self {
        Self {
            id: reminder.id,
            title: reminder.title.clone(),
            message: reminder.message.clone(),
            remind_at: reminder.remind_at,
            fired_at,
        }
    }

    /// How late the reminder fired relative to its due time.
    pub fn lateness(&self) -> chrono::Duration {
        self.fired_at - self.remind_at
    }
}
