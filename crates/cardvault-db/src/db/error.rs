use cardvault_core::IngestError;

/// Index operation errors
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// `backup_path` is already indexed
    #[error("Record already indexed: {backup_path}")]
    Conflict { backup_path: String },

    #[error("Record not found: {0}")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded into a record
    #[error("Corrupt index row: {0}")]
    Corrupt(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

impl From<IndexError> for IngestError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Conflict { backup_path } => IngestError::Conflict(backup_path),
            other => IngestError::Index(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_benign_ingest_error() {
        let err: IngestError = IndexError::Conflict {
            backup_path: "2024/03/05/clip.avi".to_string(),
        }
        .into();
        assert!(err.is_benign());
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_other_errors_map_to_index_failure() {
        let err: IngestError = IndexError::Corrupt("bad json".to_string()).into();
        assert_eq!(err.error_code(), "INDEX_ERROR");
        assert!(!err.is_benign());
    }
}
