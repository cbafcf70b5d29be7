use anyhow::{Context, Result};
use tracing::info;

use parkplanner::api::{self, AppState};
use parkplanner::{PlannerConfig, VERSION, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlannerConfig::load().context("Failed to load configuration")?;
    let _telemetry = telemetry::init(&config.logging, "parkplanner")?;

    let state = AppState::from_config(&config);
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(version = VERSION, mode = %config.mode, "Trip planner listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Trip planner stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
