use anyhow::{Context, Result};
use cardvault_worker::{DirectoryWatch, WatchConfig};

use crate::setup::{storage::prepare_watch_dir, Services};

/// Run the ingestion service until Ctrl-C.
pub async fn run(services: Services) -> Result<()> {
    let root = prepare_watch_dir(&services.config).await?;
    let watch = DirectoryWatch::start(&root, WatchConfig::from(&services.config))
        .context("Failed to start directory watch")?;

    tokio::select! {
        _ = services.coordinator.clone().run(watch) => {
            tracing::warn!("Directory watch ended unexpectedly");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}
