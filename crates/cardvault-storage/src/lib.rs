//! Cardvault Storage Library
//!
//! This crate provides the archive abstraction and its local filesystem
//! implementation.
//!
//! # Archive key format
//!
//! Keys are date-partitioned: `{year}/{month:02}/{day:02}/{original_name}`,
//! relative to the archive root. Keys must not contain `..` or a leading `/`.
//! Key generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::archive_key;
pub use local::LocalArchive;
pub use traits::{BackupOutcome, BackupStore, StorageError, StorageResult, StoredBackup};
