use clap::Parser;
use smartreminder_core::{config::SmartReminderConfig, Clock, SystemClock};
use smartreminder_scheduler::{
    ChannelNotifier, LifecycleController, ReminderService, ReminderStore, TriggerWatcher,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod app;
mod delivery;
mod http;

/// SmartReminder HTTP gateway.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to smartreminder.toml (defaults to ~/.smartreminder/smartreminder.toml).
    #[arg(long, env = "SMARTREMINDER_CONFIG")]
    config: Option<String>,

    /// Override gateway.bind.
    #[arg(long)]
    bind: Option<String>,

    /// Override gateway.port.
    #[arg(long)]
    port: Option<u16>,

    /// Override scheduler.poll_interval_secs.
    #[arg(long)]
    poll_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "smartreminder_gateway=info,smartreminder_scheduler=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    let mut config = SmartReminderConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        SmartReminderConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(secs) = cli.poll_interval_secs {
        config.scheduler.poll_interval_secs = secs;
    }
    config.validate()?;

    let zone = config.scheduler.time_zone()?;
    info!(
        timezone = %zone,
        poll_interval_secs = config.scheduler.poll_interval_secs,
        "reminder engine configured"
    );

    // One store, shared by the request layer and the single watcher.
    let store = ReminderStore::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = ReminderService::new(store.clone(), Arc::clone(&clock), zone);

    // Fired-reminder channel: TriggerWatcher → delivery task
    let (notifier, fired_rx) = ChannelNotifier::channel(config.scheduler.fired_channel_capacity);
    let watcher = TriggerWatcher::new(
        store,
        Arc::new(notifier),
        clock,
        config.scheduler.poll_interval(),
    );
    let controller = LifecycleController::start(watcher, config.scheduler.shutdown_timeout())?;

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let state = Arc::new(app::AppState::new(
        config,
        service,
        controller.subscribe_state(),
    ));
    let router = app::build_router(Arc::clone(&state));

    let delivery = tokio::spawn(delivery::run_delivery(fired_rx, Arc::clone(&state)));

    info!("SmartReminder gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // HTTP is drained; stop the watcher, then let the delivery task flush.
    if let Err(e) = controller.shutdown().await {
        warn!("watcher shutdown: {e}");
    }
    if let Err(e) = delivery.await {
        warn!("delivery task failed: {e}");
    }
    info!(fired_total = state.delivered_total(), "goodbye");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
