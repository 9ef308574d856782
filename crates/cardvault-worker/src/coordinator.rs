//! Ingestion coordinator
//!
//! Each ready file becomes its own task running extract, resolve, copy and
//! index in sequence. Failures stay inside the task: they are logged with
//! the file's name and the coordinator keeps consuming events.

use cardvault_core::{IngestError, IngestResult, LogLevel, NewFileRecord, PendingIngestion};
use cardvault_db::FileIndex;
use cardvault_processing::MetadataExtractor;
use cardvault_storage::{archive_key, BackupOutcome, BackupStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::watch::DirectoryWatch;

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new index record was written
    Indexed { id: i64, backup_path: String },
    /// The archive path was already indexed by an earlier run
    AlreadyIndexed { backup_path: String },
}

impl IngestOutcome {
    pub fn backup_path(&self) -> &str {
        match self {
            IngestOutcome::Indexed { backup_path, .. }
            | IngestOutcome::AlreadyIndexed { backup_path } => backup_path,
        }
    }
}

pub struct IngestCoordinator {
    extractor: Arc<dyn MetadataExtractor>,
    archive: Arc<dyn BackupStore>,
    index: Arc<dyn FileIndex>,
    limiter: Option<Arc<Semaphore>>,
}

impl IngestCoordinator {
    pub fn new(
        extractor: Arc<dyn MetadataExtractor>,
        archive: Arc<dyn BackupStore>,
        index: Arc<dyn FileIndex>,
    ) -> Self {
        Self {
            extractor,
            archive,
            index,
            limiter: None,
        }
    }

    /// Cap the number of ingestions running at once. `None` leaves it
    /// unbounded.
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.limiter = limit.map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    /// Consume ready files until the watch closes. Never returns early on a
    /// per-file failure.
    pub async fn run(self: Arc<Self>, mut watch: DirectoryWatch) {
        tracing::info!(
            root = %watch.root().display(),
            max_concurrent = ?self.limiter.as_ref().map(|s| s.available_permits()),
            "Ingestion coordinator started"
        );

        while let Some(ready) = watch.next().await {
            self.dispatch(ready.path);
        }

        tracing::info!("Directory watch closed, ingestion coordinator stopped");
    }

    /// Spawn the ingestion of one file.
    ///
    /// Unsupported extensions are dropped here, before any extraction, and
    /// yield `None`.
    pub fn dispatch(self: &Arc<Self>, path: PathBuf) -> Option<JoinHandle<()>> {
        let Some(pending) = PendingIngestion::new(&path) else {
            tracing::debug!(path = %path.display(), "Skipping unsupported file type");
            return None;
        };

        let span = tracing::info_span!(
            "ingest",
            ingest.id = %pending.id,
            file = %pending.original_name(),
            file_type = %pending.file_type,
        );
        let coordinator = Arc::clone(self);

        Some(tokio::spawn(
            async move {
                let _permit = match &coordinator.limiter {
                    Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => return,
                    },
                    None => None,
                };

                tracing::debug!(
                    queued_ms = pending.queued_for().as_secs_f64() * 1000.0,
                    "Ingestion started"
                );

                if let Err(e) = coordinator.ingest(&pending).await {
                    log_failure(&pending, &e);
                }
            }
            .instrument(span),
        ))
    }

    /// Run the full pipeline for one file.
    ///
    /// An index conflict on the archive path means an earlier run already
    /// recorded this file, and is reported as [`IngestOutcome::AlreadyIndexed`].
    pub async fn ingest(&self, pending: &PendingIngestion) -> IngestResult<IngestOutcome> {
        let original_name = pending.original_name();
        let started = std::time::Instant::now();

        let extracted = self.extractor.extract(&pending.path).await?;
        let created_at = extracted.creation_date();
        let key = archive_key(created_at, &original_name);

        let stored = self.archive.store(&pending.path, &key).await?;
        if stored.outcome == BackupOutcome::AlreadyPresent {
            tracing::debug!(backup_path = %stored.relative_path, "Archive copy already present");
        }

        let record = NewFileRecord {
            original_name,
            file_type: pending.file_type,
            backup_path: stored.relative_path,
            metadata: extracted.tags,
            created_at,
        };

        match self.index.insert(&record).await.map_err(IngestError::from) {
            Ok(id) => {
                tracing::info!(
                    id,
                    backup_path = %record.backup_path,
                    created_at = %record.created_at,
                    date_source = ?extracted.date_source,
                    duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "File archived and indexed"
                );
                Ok(IngestOutcome::Indexed {
                    id,
                    backup_path: record.backup_path,
                })
            }
            Err(IngestError::Conflict(backup_path)) => {
                tracing::debug!(backup_path = %backup_path, "File already indexed, skipping");
                Ok(IngestOutcome::AlreadyIndexed { backup_path })
            }
            Err(e) => Err(e),
        }
    }
}

fn log_failure(pending: &PendingIngestion, err: &IngestError) {
    let file = pending.original_name();
    if err.is_benign() {
        tracing::debug!(
            file = %file,
            error_code = err.error_code(),
            error = %err,
            "Ingestion skipped"
        );
        return;
    }

    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            file = %file,
            error_code = err.error_code(),
            error = %err,
            "Ingestion failed"
        ),
        LogLevel::Warn => tracing::warn!(
            file = %file,
            error_code = err.error_code(),
            error = %err,
            "Ingestion failed"
        ),
        LogLevel::Error => tracing::error!(
            file = %file,
            path = %pending.path.display(),
            error_code = err.error_code(),
            error = %err,
            "Ingestion failed"
        ),
    }
}
