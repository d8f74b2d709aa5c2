//! Starts the trigger watcher at process start and stops it at shutdown.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info, warn};

use crate::{
    error::{Result, SchedulerError},
    store::ReminderStore,
    types::WatcherState,
    watcher::TriggerWatcher,
};

/// Owns the single watcher task bound to a store.
///
/// Dropping the controller without calling [`shutdown`](Self::shutdown)
/// aborts the task.
pub struct LifecycleController {
    store: ReminderStore,
    state: Arc<watch::Sender<WatcherState>>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    fired_total: Arc<AtomicU64>,
    shutdown_timeout: Duration,
}

impl LifecycleController {
    /// Spawn `watcher` on the current Tokio runtime.
    ///
    /// Fails with `WatcherAlreadyRunning` if another watcher is bound to the
    /// same store.
    pub fn start(watcher: TriggerWatcher, shutdown_timeout: Duration) -> Result<Self> {
        let store = watcher.store().clone();
        if !store.try_attach_watcher() {
            return Err(SchedulerError::WatcherAlreadyRunning);
        }

        let fired_total = watcher.fired_counter();
        let (state_tx, _) = watch::channel(WatcherState::Running);
        let state = Arc::new(state_tx);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task_state = Arc::clone(&state);
        let task = tokio::spawn(async move {
            watcher.run(shutdown_rx).await;
            task_state.send_replace(WatcherState::Stopped);
        });
        info!("trigger watcher spawned");

        Ok(Self {
            store,
            state,
            shutdown_tx,
            task: Some(task),
            fired_total,
            shutdown_timeout,
        })
    }

    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// Observe state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<WatcherState> {
        self.state.subscribe()
    }

    pub fn fired_total(&self) -> u64 {
        self.fired_total.load(Ordering::Relaxed)
    }

    /// Signal `Stopping` and wait, bounded by the shutdown timeout, for the
    /// watcher to exit. An in-flight scan is allowed to finish.
    ///
    /// On timeout the task is aborted and `ShutdownTimeout` is returned.
    pub async fn shutdown(mut self) -> Result<()> {
        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        self.state.send_replace(WatcherState::Stopping);
        let _ = self.shutdown_tx.send(true);
        info!(
            timeout_ms = self.shutdown_timeout.as_millis() as u64,
            "stopping trigger watcher"
        );

        let outcome = match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("trigger watcher task failed: {e}");
                Ok(())
            }
            Err(_) => {
                task.abort();
                let ms = self.shutdown_timeout.as_millis() as u64;
                warn!(timeout_ms = ms, "trigger watcher did not stop in time, aborted");
                Err(SchedulerError::ShutdownTimeout { ms })
            }
        };

        self.state.send_replace(WatcherState::Stopped);
        self.store.detach_watcher();
        info!(fired_total = self.fired_total(), "trigger watcher stopped");
        outcome
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.shutdown_tx.send(true);
            task.abort();
            self.state.send_replace(WatcherState::Stopped);
            self.store.detach_watcher();
        }
    }
}
