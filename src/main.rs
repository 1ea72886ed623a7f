use domain::retention::{start_sweeper, DatabaseMessageStore, Sweeper};
use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting anonymous chat relay [{:?}] on {}:{}",
        config.runtime_env(),
        config.interface,
        config.port
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let sweeper = Sweeper::new(Arc::new(DatabaseMessageStore::new(db)));
    let relay_manager = Arc::new(relay::Manager::new());
    let shutdown = CancellationToken::new();

    let sweeper_handle = if config.retention_sweep_enabled {
        Some(tokio::spawn(start_sweeper(
            sweeper.clone(),
            Duration::from_secs(config.retention_sweep_interval_secs),
            shutdown.clone(),
        )))
    } else {
        info!("Scheduled retention sweeps disabled; use /api/run-cron-job instead");
        None
    };

    tokio::spawn(shutdown_signal(shutdown.clone()));

    let app_state = AppState::new(config, relay_manager, sweeper);
    if let Err(e) = web::init_server(app_state, shutdown.clone()).await {
        error!("Server error: {e}");
        shutdown.cancel();
    }

    if let Some(handle) = sweeper_handle {
        if let Err(e) = handle.await {
            warn!("Retention sweeper task ended abnormally: {e}");
        }
    }

    info!("Shutdown complete");
}

/// Cancel `shutdown` once Ctrl-C is received.
async fn shutdown_signal(shutdown: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received SIGINT, starting graceful shutdown...");
            shutdown.cancel();
        }
        Err(e) => error!("Failed to listen for SIGINT: {e}"),
    }
}
