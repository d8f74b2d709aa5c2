//! Reminder service: the entry point request handlers use.
//!
//! Validation always runs before the store is touched, so a rejected request
//! never mutates state.

use std::sync::Arc;

use chrono_tz::Tz;
use smartreminder_core::{normalize_timestamp, Clock, NewReminder, Reminder, ReminderId};
use tracing::info;

use crate::{
    error::{Result, SchedulerError},
    store::ReminderStore,
};

#[derive(Clone)]
pub struct ReminderService {
    store: ReminderStore,
    clock: Arc<dyn Clock>,
    zone: Tz,
}

impl ReminderService {
    /// `zone` is the reference zone for timestamps that carry no offset.
    pub fn new(store: ReminderStore, clock: Arc<dyn Clock>, zone: Tz) -> Self {
        Self { store, clock, zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Validate and store a new reminder.
    ///
    /// Errors: `Validation` for empty text or a non-future `remind_at`,
    /// `Conflict` if the id is already pending.
    pub fn create(&self, req: NewReminder) -> Result<Reminder> {
        let reminder = self.validate(req)?;
        self.store.insert(reminder.clone()).map_err(|e| match e {
            SchedulerError::DuplicateId { id } => SchedulerError::Conflict { id },
            other => other,
        })?;
        info!(
            reminder_id = %reminder.id,
            title = %reminder.title,
            remind_at = %reminder.remind_at.to_rfc3339(),
            "reminder created"
        );
        Ok(reminder)
    }

    /// All pending reminders in creation order.
    pub fn list(&self) -> Vec<Reminder> {
        self.store.list()
    }

    pub fn get(&self, id: ReminderId) -> Result<Reminder> {
        self.store.get(id).ok_or(SchedulerError::NotFound { id })
    }

    /// Delete a pending reminder and return it.
    pub fn delete(&self, id: ReminderId) -> Result<Reminder> {
        let removed = self
            .store
            .remove(id)
            .ok_or(SchedulerError::NotFound { id })?;
        info!(reminder_id = %id, title = %removed.title, "reminder deleted");
        Ok(removed)
    }

    pub fn pending(&self) -> usize {
        self.store.len()
    }

    fn validate(&self, req: NewReminder) -> Result<Reminder> {
        if req.title.is_empty() {
            return Err(SchedulerError::Validation(
                "title must not be empty".to_string(),
            ));
        }
        if req.message.is_empty() {
            return Err(SchedulerError::Validation(
                "message must not be empty".to_string(),
            ));
        }

        let remind_at = normalize_timestamp(&req.remind_at, self.zone)
            .map_err(|e| SchedulerError::Validation(e.to_string()))?;
        if remind_at <= self.clock.now() {
            return Err(SchedulerError::Validation(
                "remind_at must be a future datetime (UTC).".to_string(),
            ));
        }

        Ok(Reminder {
            id: req.id,
            title: req.title,
            message: req.message,
            remind_at,
        })
    }
}
