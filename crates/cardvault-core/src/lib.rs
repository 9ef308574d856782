//! Cardvault Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every cardvault component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{IngestError, LogLevel};
pub use models::{FileKind, FileRecord, FileType, NewFileRecord, PendingIngestion};

/// Result type for per-file pipeline stages
pub type IngestResult<T> = Result<T, IngestError>;
