//! two-sum-node
//!
//! Runs the emitter and correlator in one process until Ctrl-C.

use bus::Bus;
use node::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(version = node::VERSION, "Starting two-sum node");

    let config = NodeConfig::load()?;
    let bus = Bus::new();
    let runtime = NodeRuntime::launch(&bus, &config)?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    let summary = runtime.shutdown().await;
    for (name, value) in &summary.correlator {
        info!(metric = %name, value, "Final counter");
    }

    Ok(())
}
