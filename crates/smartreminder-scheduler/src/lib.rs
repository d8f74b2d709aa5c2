//! `smartreminder-scheduler` — in-memory one-shot reminder engine.
//!
//! # Overview
//!
//! | Piece                   | Role                                                   |
//! |-------------------------|--------------------------------------------------------|
//! | [`ReminderStore`]       | Mutex-guarded pending reminders, insertion ordered     |
//! | [`TriggerWatcher`]      | Polls the store and fires due reminders                |
//! | [`ReminderService`]     | Validated create/list/get/delete for request handlers  |
//! | [`LifecycleController`] | Spawns the single watcher task and stops it on shutdown |
//!
//! A reminder exists in the store exactly while it is pending. The watcher
//! removes it only once its notification went out, and nothing is kept after
//! a reminder fires. State is not persisted across restarts.

pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod service;
pub mod store;
pub mod types;
pub mod watcher;

pub use error::{Result, SchedulerError};
pub use lifecycle::LifecycleController;
pub use notify::{ChannelNotifier, LogNotifier, Notifier};
pub use service::ReminderService;
pub use store::{Claim, ReminderStore};
pub use types::{ScanOutcome, ScanReport, WatcherState};
pub use watcher::TriggerWatcher;
