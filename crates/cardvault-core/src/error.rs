//! Error types module
//!
//! All ingestion failures are unified under [`IngestError`]. Only
//! [`IngestError::FatalStartup`] is allowed to stop the process; every other
//! variant is scoped to a single file and is absorbed by the ingestion
//! coordinator after logging.

use std::io;
use std::path::{Path, PathBuf};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected outcomes like unsupported files or duplicates
    Debug,
    /// Warning level - for bad input files; the pipeline itself is healthy
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Watch root or archive root unusable at launch.
    #[error("Startup failed: {0}")]
    FatalStartup(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Failed to parse metadata of {file}: {message}")]
    ParseFailure { file: String, message: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Archive target or index key already taken. Callers treat this as success.
    #[error("Already archived: {0}")]
    Conflict(String),

    #[error("Index error: {0}")]
    Index(String),
}

impl IngestError {
    pub fn parse(file: impl Into<String>, message: impl ToString) -> Self {
        IngestError::ParseFailure {
            file: file.into(),
            message: message.to_string(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        IngestError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Machine-readable error code (e.g., "PARSE_FAILURE")
    pub fn error_code(&self) -> &'static str {
        ingest_error_static_metadata(self).0
    }

    /// Log level this error should be reported at
    pub fn log_level(&self) -> LogLevel {
        ingest_error_static_metadata(self).1
    }

    /// Whether this error must terminate the process
    pub fn is_fatal(&self) -> bool {
        ingest_error_static_metadata(self).2
    }

    /// Conflicts are idempotent no-ops, not failures.
    pub fn is_benign(&self) -> bool {
        matches!(self, IngestError::Conflict(_) | IngestError::UnsupportedType(_))
    }
}

/// Static metadata for each variant: (error_code, log_level, fatal).
fn ingest_error_static_metadata(err: &IngestError) -> (&'static str, LogLevel, bool) {
    match err {
        IngestError::FatalStartup(_) => ("FATAL_STARTUP", LogLevel::Error, true),
        IngestError::UnsupportedType(_) => ("UNSUPPORTED_TYPE", LogLevel::Debug, false),
        IngestError::ParseFailure { .. } => ("PARSE_FAILURE", LogLevel::Warn, false),
        IngestError::Io { .. } => ("IO_FAILURE", LogLevel::Error, false),
        IngestError::Conflict(_) => ("CONFLICT", LogLevel::Debug, false),
        IngestError::Index(_) => ("INDEX_ERROR", LogLevel::Error, false),
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Index(format!("JSON encoding error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_startup_errors_are_fatal() {
        assert!(IngestError::FatalStartup("missing".to_string()).is_fatal());
        assert!(!IngestError::parse("a.jpg", "bad tiff").is_fatal());
        assert!(!IngestError::io("/tmp/a.jpg", io::Error::other("disk full")).is_fatal());
        assert!(!IngestError::Index("locked".to_string()).is_fatal());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(
            IngestError::UnsupportedType("png".to_string()).log_level(),
            LogLevel::Debug
        );
        assert_eq!(
            IngestError::Conflict("2024/03/05/a.jpg".to_string()).log_level(),
            LogLevel::Debug
        );
        assert_eq!(
            IngestError::parse("a.jpg", "bad tiff").log_level(),
            LogLevel::Warn
        );
        assert_eq!(
            IngestError::io("/tmp/a.jpg", io::Error::other("disk full")).log_level(),
            LogLevel::Error
        );
        assert_eq!(
            IngestError::Index("locked".to_string()).log_level(),
            LogLevel::Error
        );
    }

    #[test]
    fn test_benign_errors() {
        assert!(IngestError::Conflict("x".to_string()).is_benign());
        assert!(IngestError::UnsupportedType("png".to_string()).is_benign());
        assert!(!IngestError::Index("x".to_string()).is_benign());
    }

    #[test]
    fn test_messages_name_the_file() {
        let err = IngestError::parse("holiday.jpg", "truncated IFD");
        assert_eq!(err.error_code(), "PARSE_FAILURE");
        assert!(err.to_string().contains("holiday.jpg"));
        assert!(err.to_string().contains("truncated IFD"));

        let err = IngestError::io("/archive/2024/a.jpg", io::Error::other("denied"));
        assert_eq!(err.error_code(), "IO_FAILURE");
        assert!(err.to_string().contains("/archive/2024/a.jpg"));
    }
}
