//! File-system timestamp fallback

use chrono::{DateTime, Utc};
use std::path::Path;

/// Creation time of a file as reported by the file system.
///
/// Uses the birth time where the platform records one, else the modification
/// time. Never fails: if the file cannot be stat'ed at all the current time
/// is returned and a warning is logged.
pub async fn filesystem_creation_time(path: &Path) -> DateTime<Utc> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to stat file for creation time, using current time"
            );
            return Utc::now();
        }
    };

    match metadata.created().or_else(|_| metadata.modified()) {
        Ok(time) => DateTime::<Utc>::from(time),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "File system reports no birth or modification time, using current time"
            );
            Utc::now()
        }
    }
}
