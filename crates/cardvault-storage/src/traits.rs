//! Backup store abstraction
//!
//! This module defines the BackupStore trait the ingestion coordinator writes
//! archive copies through.

use async_trait::async_trait;
use cardvault_core::IngestError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid archive key: {0}")]
    InvalidKey(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StorageError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for IngestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io { path, source } => IngestError::Io { path, source },
            StorageError::ConfigError(msg) => IngestError::FatalStartup(msg),
            StorageError::InvalidKey(key) => IngestError::Io {
                path: PathBuf::from(&key),
                source: io::Error::new(io::ErrorKind::InvalidInput, "invalid archive key"),
            },
            StorageError::BackendError(msg) => IngestError::Io {
                path: PathBuf::new(),
                source: io::Error::other(msg),
            },
        }
    }
}

/// What a store call did with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Bytes were copied to a previously empty destination
    Copied,
    /// The destination already existed and was left untouched
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBackup {
    /// Key relative to the archive root
    pub relative_path: String,
    pub outcome: BackupOutcome,
}

/// Archive backend
///
/// Writes are idempotent: storing onto an occupied key never overwrites it.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Copy `source` to `key`, creating intermediate directories.
    async fn store(&self, source: &Path, key: &str) -> StorageResult<StoredBackup>;

    /// Check if an archive entry exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Absolute location of `key` under the archive root.
    fn resolve(&self, key: &str) -> StorageResult<PathBuf>;

    fn root(&self) -> &Path;
}
