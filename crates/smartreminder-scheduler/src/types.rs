use serde::{Deserialize, Serialize};

/// Lifecycle state of the trigger watcher.
///
/// `Stopped -> Running -> Stopping -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    /// No scan loop is active.
    Stopped,
    /// Scanning on every poll interval.
    Running,
    /// Shutdown requested; an in-flight scan may still be finishing.
    Stopping,
}

impl std::fmt::Display for WatcherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WatcherState::Stopped => "stopped",
            WatcherState::Running => "running",
            WatcherState::Stopping => "stopping",
        };
        write!(f, "{s}")
    }
}

/// Counters for a single completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Snapshot entries whose `remind_at` had arrived.
    pub due: usize,
    /// Reminders fired and removed by this scan.
    pub fired: usize,
    /// Due entries already removed by someone else before they could be claimed.
    pub already_handled: usize,
    /// Due entries whose notification failed; left in the store for the next scan.
    pub failed: usize,
}

/// Result of asking the watcher to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanReport),
    /// Another scan was still in flight, so this one did nothing.
    Skipped,
}

impl ScanOutcome {
    /// The report of a completed scan, or `None` if it was skipped.
    pub fn report(self) -> Option<ScanReport> {
        match self {
            ScanOutcome::Completed(report) => Some(report),
            ScanOutcome::Skipped => None,
        }
    }
}
