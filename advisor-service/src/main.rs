use advisor_core::AdvisorConfig;
use advisor_service::{create_app, telemetry::init_tracing};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON tracing
    init_tracing();

    // Missing variables fall back to defaults; malformed numbers abort startup
    let config = AdvisorConfig::from_env()?;
    let app = create_app(&config).await;

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Insurance advisor service starting on {}", addr);
    info!("API overview available at http://{}/", addr);
    info!("Health check endpoint: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
