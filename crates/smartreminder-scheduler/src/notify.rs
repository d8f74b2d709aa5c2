//! Firing notification sinks.

use async_trait::async_trait;
use smartreminder_core::Firing;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::info;

use crate::error::{Result, SchedulerError};

/// Receives one call per fired reminder.
///
/// Called outside the store lock. An `Err` makes the watcher put the reminder
/// back so it is evaluated again on the next scan.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn notify(&self, firing: &Firing) -> Result<()>;
}

/// Emits the firing as a structured log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, firing: &Firing) -> Result<()> {
        info!(
            reminder_id = %firing.id,
            title = %firing.title,
            message = %firing.message,
            fired_at = %firing.fired_at.to_rfc3339(),
            "reminder triggered"
        );
        Ok(())
    }
}

/// Forwards firings to a delivery task over mpsc.
///
/// Uses `try_send` so a slow consumer never stalls the scan; a full or closed
/// channel is reported as a notification failure.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Firing>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<Firing>) -> Self {
        Self { tx }
    }

    /// Build a notifier together with the receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Firing>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    fn name(&self) -> &str {
        "channel"
    }

    async fn notify(&self, firing: &Firing) -> Result<()> {
        self.tx.try_send(firing.clone()).map_err(|e| match e {
            TrySendError::Full(_) => SchedulerError::Notify("delivery channel full".to_string()),
            TrySendError::Closed(_) => {
                SchedulerError::Notify("delivery channel closed".to_string())
            }
        })
    }
}
