//! Index database setup

use anyhow::{Context, Result};
use cardvault_core::{Config, IngestError};
use cardvault_db::SqliteFileIndex;
use std::sync::Arc;

/// Open the index, creating the database file and `files` table if needed.
pub async fn setup_index(config: &Config) -> Result<Arc<SqliteFileIndex>> {
    let index = SqliteFileIndex::connect(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| {
            IngestError::FatalStartup(format!(
                "Failed to open index {}: {}",
                config.database_url, e
            ))
        })
        .context("Index database unavailable")?;

    Ok(Arc::new(index))
}
