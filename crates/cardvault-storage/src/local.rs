use crate::traits::{BackupOutcome, BackupStore, StorageError, StorageResult, StoredBackup};
use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local filesystem archive
#[derive(Debug, Clone)]
pub struct LocalArchive {
    base_path: PathBuf,
}

impl LocalArchive {
    /// Open (creating if needed) the archive rooted at `base_path`.
    ///
    /// Fails with `ConfigError` when the root cannot be created or is not a
    /// directory.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create archive directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let base_path = base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to canonicalize archive directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        if !base_path.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "Archive root {} is not a directory",
                base_path.display()
            )));
        }

        Ok(LocalArchive { base_path })
    }

    /// Convert an archive key to a filesystem path with security validation
    ///
    /// Rejects keys that could escape the archive root. Each `/` segment must
    /// be a single normal path component; dots inside a file name are fine.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let mut path = self.base_path.clone();
        for segment in key.split('/') {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => path.push(part),
                _ => return Err(StorageError::InvalidKey(key.to_string())),
            }
        }

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&self.base_path).is_err() {
                return Err(StorageError::InvalidKey(format!(
                    "{} resolves outside the archive",
                    key
                )));
            }
        }

        Ok(path)
    }

    /// Ensure parent directory exists. Safe to race with other tasks.
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }
        Ok(())
    }
}

/// Copy into a temp file beside `dest`, then link it into place only if
/// `dest` is still vacant. A concurrent writer that wins the race leaves us
/// with `AlreadyPresent` and no partial file.
fn copy_noclobber(source: &Path, dest: &Path) -> StorageResult<BackupOutcome> {
    let parent = dest
        .parent()
        .ok_or_else(|| StorageError::InvalidKey(dest.display().to_string()))?;

    let mut reader = std::fs::File::open(source).map_err(|e| StorageError::io(source, e))?;
    let mut staged = tempfile::Builder::new()
        .prefix(".cardvault-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| StorageError::io(parent, e))?;

    io::copy(&mut reader, staged.as_file_mut()).map_err(|e| StorageError::io(source, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| StorageError::io(staged.path(), e))?;

    match staged.persist_noclobber(dest) {
        Ok(_) => Ok(BackupOutcome::Copied),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            Ok(BackupOutcome::AlreadyPresent)
        }
        Err(e) => Err(StorageError::io(dest, e.error)),
    }
}

#[async_trait]
impl BackupStore for LocalArchive {
    #[tracing::instrument(skip(self), fields(source = %source.display()))]
    async fn store(&self, source: &Path, key: &str) -> StorageResult<StoredBackup> {
        let dest = self.key_to_path(key)?;
        self.ensure_parent_dir(&dest).await?;

        if fs::try_exists(&dest)
            .await
            .map_err(|e| StorageError::io(&dest, e))?
        {
            tracing::debug!(key = %key, "Archive entry already present, skipping copy");
            return Ok(StoredBackup {
                relative_path: key.to_string(),
                outcome: BackupOutcome::AlreadyPresent,
            });
        }

        let start = std::time::Instant::now();
        let source_path = source.to_path_buf();
        let dest_path = dest.clone();
        let outcome = tokio::task::spawn_blocking(move || copy_noclobber(&source_path, &dest_path))
            .await
            .map_err(|e| StorageError::BackendError(format!("Copy task failed: {}", e)))??;

        match outcome {
            BackupOutcome::Copied => tracing::info!(
                path = %dest.display(),
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Archive copy written"
            ),
            BackupOutcome::AlreadyPresent => tracing::debug!(
                key = %key,
                "Archive entry appeared during copy, keeping existing file"
            ),
        }

        Ok(StoredBackup {
            relative_path: key.to_string(),
            outcome,
        })
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))
    }

    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        self.key_to_path(key)
    }

    fn root(&self) -> &Path {
        &self.base_path
    }
}
