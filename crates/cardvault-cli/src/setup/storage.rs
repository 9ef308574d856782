//! Archive and watch-root setup

use anyhow::{Context, Result};
use cardvault_core::{Config, IngestError};
use cardvault_storage::{BackupStore, LocalArchive};
use std::path::PathBuf;
use std::sync::Arc;

/// Open the archive root, creating it when missing.
pub async fn setup_archive(config: &Config) -> Result<Arc<LocalArchive>> {
    let archive = LocalArchive::new(&config.backup_dir)
        .await
        .map_err(IngestError::from)
        .context("Archive root unusable")?;

    tracing::info!(root = %archive.root().display(), "Archive ready");
    Ok(Arc::new(archive))
}

/// Resolve the watch root. A missing root is created only when
/// `CREATE_WATCH_DIR` is set; otherwise it is a startup failure.
pub async fn prepare_watch_dir(config: &Config) -> Result<PathBuf> {
    let root = &config.watch_dir;

    if !tokio::fs::try_exists(root).await.unwrap_or(false) {
        if !config.create_watch_dir {
            return Err(IngestError::FatalStartup(format!(
                "Watch directory {} does not exist (set CREATE_WATCH_DIR=true to create it)",
                root.display()
            ))
            .into());
        }

        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| IngestError::io(root, e))
            .context("Failed to create watch directory")?;
        tracing::info!(root = %root.display(), "Created watch directory");
    }

    Ok(root.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_watch_dir_is_fatal_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            watch_dir: dir.path().join("card"),
            ..Config::default()
        };
        assert!(prepare_watch_dir(&config).await.is_err());
        assert!(!config.watch_dir.exists());
    }

    #[tokio::test]
    async fn test_missing_watch_dir_created_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            watch_dir: dir.path().join("card"),
            create_watch_dir: true,
            ..Config::default()
        };
        let root = prepare_watch_dir(&config).await.unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_archive_root_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            backup_dir: dir.path().join("backup").join("nested"),
            ..Config::default()
        };
        setup_archive(&config).await.unwrap();
        assert!(config.backup_dir.is_dir());
    }
}
