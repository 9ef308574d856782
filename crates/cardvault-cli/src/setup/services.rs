//! Coordinator wiring

use anyhow::{Context, Result};
use cardvault_core::Config;
use cardvault_db::SqliteFileIndex;
use cardvault_processing::{FfprobeProbe, MetadataDispatcher};
use cardvault_storage::LocalArchive;
use cardvault_worker::IngestCoordinator;
use std::sync::Arc;

/// Extractors over ffprobe, the local archive and the SQLite index.
pub fn build_coordinator(
    config: &Config,
    archive: Arc<LocalArchive>,
    index: Arc<SqliteFileIndex>,
) -> Result<Arc<IngestCoordinator>> {
    let probe = FfprobeProbe::new(config.ffprobe_path.clone(), config.probe_timeout())
        .context("Invalid FFPROBE_PATH")?;
    let dispatcher = MetadataDispatcher::with_ffprobe(probe);

    let coordinator = IngestCoordinator::new(Arc::new(dispatcher), archive, index)
        .with_concurrency_limit(config.max_concurrent_ingests());

    tracing::info!(
        ffprobe = %config.ffprobe_path,
        probe_timeout_secs = config.probe_timeout_secs,
        max_concurrent_ingests = config.max_concurrent_ingests,
        "Ingestion pipeline configured"
    );

    Ok(Arc::new(coordinator))
}
