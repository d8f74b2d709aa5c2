//! Delivery task: drains fired reminders from the watcher's channel.

use std::sync::Arc;

use smartreminder_core::Firing;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::AppState;

/// Log every firing and count it. Exits once the watcher (the only sender)
/// has been dropped.
pub async fn run_delivery(mut fired_rx: mpsc::Receiver<Firing>, state: Arc<AppState>) {
    while let Some(firing) = fired_rx.recv().await {
        let total = state.record_delivery();
        info!(
            reminder_id = %firing.id,
            title = %firing.title,
            message = %firing.message,
            fired_at = %firing.fired_at.to_rfc3339(),
            late_ms = firing.lateness().num_milliseconds(),
            total,
            "reminder triggered"
        );
    }
    debug!("delivery channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use smartreminder_core::{config::SmartReminderConfig, ManualClock, Reminder, ReminderId};
    use smartreminder_scheduler::{ReminderService, ReminderStore, WatcherState};
    use tokio::sync::watch;

    #[tokio::test]
    async fn counts_firings_until_channel_closes() {
        let service = ReminderService::new(
            ReminderStore::new(),
            Arc::new(ManualClock::new(Utc::now())),
            chrono_tz::Tz::UTC,
        );
        let (_state_tx, state_rx) = watch::channel(WatcherState::Running);
        let state = Arc::new(AppState::new(SmartReminderConfig::default(), service, state_rx));

        let (tx, rx) = mpsc::channel(4);
        let task = tokio::spawn(run_delivery(rx, Arc::clone(&state)));
        for id in 0..3 {
            let reminder = Reminder {
                id: ReminderId(id),
                title: "t".into(),
                message: "m".into(),
                remind_at: Utc::now(),
            };
            tx.send(Firing::new(&reminder, Utc::now())).await.unwrap();
        }
        drop(tx);
        task.await.unwrap();
        assert_eq!(state.delivered_total(), 3);
    }
}
