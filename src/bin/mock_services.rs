//! Synthetic weather, hotel, restaurant and route backends

use anyhow::{Context, Result};
use tracing::info;

use parkplanner::mock::{self, MockState};
use parkplanner::{PlannerConfig, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlannerConfig::load().context("Failed to load configuration")?;
    let _telemetry = telemetry::init(&config.logging, "parkplanner-mock-services")?;

    let app = mock::router(MockState::from_config(&config.mock));

    let addr = format!("{}:{}", config.server.host, config.server.mock_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(seed = ?config.mock.seed, "Mock services listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await
        .context("Mock server error")?;
    Ok(())
}
