use axum::{
    routing::{get, post},
    Router,
};
use smartreminder_core::config::SmartReminderConfig;
use smartreminder_scheduler::{ReminderService, WatcherState};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::watch;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: SmartReminderConfig,
    pub reminders: ReminderService,
    /// Read side of the lifecycle controller's state channel.
    pub watcher_state: watch::Receiver<WatcherState>,
    /// Firings handed to the delivery task so far.
    pub delivered: AtomicU64,
}

impl AppState {
    pub fn new(
        config: SmartReminderConfig,
        reminders: ReminderService,
        watcher_state: watch::Receiver<WatcherState>,
    ) -> Self {
        Self {
            config,
            reminders,
            watcher_state,
            delivered: AtomicU64::new(0),
        }
    }

    pub fn record_delivery(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn delivered_total(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::http::home::home_handler))
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/reminders",
            post(crate::http::reminders::create_reminder)
                .get(crate::http::reminders::list_reminders),
        )
        .route(
            "/reminders/{id}",
            get(crate::http::reminders::get_reminder)
                .delete(crate::http::reminders::delete_reminder),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
