//! Settlement service binary

use anyhow::Context;
use settlement::{Config, PaymentService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting settlement service");

    // Load configuration: explicit file wins, env overrides otherwise
    let config = match std::env::var("SETTLE_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => Config::from_env()?,
    };

    let _service = PaymentService::open(config)?;
    tracing::info!("Service ready");

    // The HTTP/RPC boundary mounts on top of PaymentService; the binary
    // itself just holds the service open.
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down settlement service");
    Ok(())
}
