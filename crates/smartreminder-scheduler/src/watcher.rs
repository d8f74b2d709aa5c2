use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use smartreminder_core::{Clock, Firing};
use tokio::{
    sync::{watch, Mutex},
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, warn};

use crate::{
    notify::Notifier,
    store::ReminderStore,
    types::{ScanOutcome, ScanReport},
};

/// Background task that fires due reminders.
///
/// Each scan takes a snapshot of the store, then claims and notifies due
/// reminders one by one. A claimed reminder stays in the store until its
/// notification succeeds. The store lock is never held across a notification.
pub struct TriggerWatcher {
    store: ReminderStore,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    /// Serializes scans; a scan that finds it held is skipped.
    scan_guard: Mutex<()>,
    fired_total: Arc<AtomicU64>,
}

impl TriggerWatcher {
    pub fn new(
        store: ReminderStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            poll_interval,
            scan_guard: Mutex::new(()),
            fired_total: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &ReminderStore {
        &self.store
    }

    /// Shared counter of reminders fired since construction.
    pub fn fired_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.fired_total)
    }

    /// Main loop. Scans every `poll_interval` until `shutdown` broadcasts `true`
    /// or its sender is dropped.
    ///
    /// Shutdown is only observed between scans; an in-flight scan always
    /// completes.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.poll_interval.as_millis() as u64,
            notifier = self.notifier.name(),
            "trigger watcher started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        // A scan that overruns the interval must not cause a burst of catch-up scans.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    match self.scan().await {
                        ScanOutcome::Completed(report) if report.due > 0 => {
                            info!(
                                due = report.due,
                                fired = report.fired,
                                already_handled = report.already_handled,
                                failed = report.failed,
                                "scan complete"
                            );
                        }
                        ScanOutcome::Completed(_) => debug!("scan complete, nothing due"),
                        ScanOutcome::Skipped => debug!("previous scan still running, tick skipped"),
                    }
                }
            }
        }

        info!("trigger watcher shutting down");
    }

    /// Run one scan over a snapshot of the store.
    ///
    /// Returns `Skipped` without touching the store if another scan is in
    /// progress.
    pub async fn scan(&self) -> ScanOutcome {
        let Ok(_guard) = self.scan_guard.try_lock() else {
            return ScanOutcome::Skipped;
        };

        let snapshot = self.store.list();
        let mut report = ScanReport::default();

        for reminder in snapshot {
            let now = self.clock.now();
            if now < reminder.remind_at {
                continue;
            }
            report.due += 1;

            // The snapshot may be stale: claiming re-checks presence and due
            // time under the lock, so a concurrently deleted reminder never fires.
            let Some(claim) = self.store.claim_due(reminder.id, now) else {
                debug!(reminder_id = %reminder.id, "due reminder already handled");
                report.already_handled += 1;
                continue;
            };

            let firing = Firing::new(claim.reminder(), now);
            match self.notifier.notify(&firing).await {
                Ok(()) => {
                    report.fired += 1;
                    self.fired_total.fetch_add(1, Ordering::Relaxed);
                    if !self.store.complete(claim) {
                        debug!(reminder_id = %firing.id, "reminder deleted while firing");
                    }
                    debug!(
                        reminder_id = %firing.id,
                        late_ms = firing.lateness().num_milliseconds(),
                        "reminder fired"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    if self.store.release(claim) {
                        error!(
                            reminder_id = %firing.id,
                            "notification failed, keeping reminder: {e}"
                        );
                    } else {
                        warn!(
                            reminder_id = %firing.id,
                            "notification failed for deleted reminder: {e}"
                        );
                    }
                }
            }
        }

        ScanOutcome::Completed(report)
    }
}
