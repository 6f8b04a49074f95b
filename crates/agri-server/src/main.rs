//! AgriBridge server entry point.

use std::process::ExitCode;

use agri_server::{AppConfig, AppState, ServerError, build_router};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "agri_server=info,agribridge=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "AgriBridge server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    info!("Starting AgriBridge server...");

    let config = AppConfig::load(None)?;
    for warning in config.startup_warnings() {
        warn!("{warning}");
    }

    let state = AppState::initialize(&config).await?;
    let app = build_router(state, &config.server);

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    info!(address = %listener.local_addr()?, "AgriBridge API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AgriBridge server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
