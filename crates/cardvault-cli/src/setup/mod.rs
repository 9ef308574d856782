//! Application setup and initialization
//!
//! Builds the archive, index and coordinator from a [`Config`]. Any failure
//! here is a startup failure and ends the process.

pub mod database;
pub mod services;
pub mod storage;
pub mod telemetry;

use anyhow::Result;
use cardvault_core::Config;
use cardvault_db::SqliteFileIndex;
use cardvault_storage::LocalArchive;
use cardvault_worker::IngestCoordinator;
use std::sync::Arc;

/// Long-lived components shared by every command
pub struct Services {
    pub config: Config,
    pub archive: Arc<LocalArchive>,
    pub index: Arc<SqliteFileIndex>,
    pub coordinator: Arc<IngestCoordinator>,
}

/// Initialize the archive, the index and the coordinator.
pub async fn initialize(config: Config) -> Result<Services> {
    let archive = storage::setup_archive(&config).await?;
    let index = database::setup_index(&config).await?;
    let coordinator = services::build_coordinator(&config, archive.clone(), index.clone())?;

    Ok(Services {
        config,
        archive,
        index,
        coordinator,
    })
}

/// Only what the read-only query commands need.
pub async fn initialize_index(config: &Config) -> Result<Arc<SqliteFileIndex>> {
    database::setup_index(config).await
}
