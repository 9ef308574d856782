use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::file_type::FileType;

/// One file moving through the pipeline. Lives only in memory and is dropped
/// on completion or on a terminal failure; it is never retried automatically.
#[derive(Debug, Clone)]
pub struct PendingIngestion {
    /// Correlation id for log lines of this ingestion
    pub id: Uuid,
    pub path: PathBuf,
    pub file_type: FileType,
    pub detected_at: DateTime<Utc>,
}

impl PendingIngestion {
    /// Returns `None` when the path has no supported extension.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let file_type = FileType::from_path(&path)?;
        Some(Self {
            id: Uuid::new_v4(),
            path,
            file_type,
            detected_at: Utc::now(),
        })
    }

    /// Time spent between detection and now.
    pub fn queued_for(&self) -> std::time::Duration {
        (Utc::now() - self.detected_at).to_std().unwrap_or_default()
    }

    /// Base name of the source path, as observed at ingestion.
    pub fn original_name(&self) -> String {
        base_name(&self.path)
    }
}

pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
