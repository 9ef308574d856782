//! Data models for the ingestion pipeline
//!
//! Each sub-module represents one concept: supported file types, the
//! persisted index record, and the transient in-flight ingestion.

mod file_record;
mod file_type;
mod ingestion;

// Re-export all models for convenient imports
pub use file_record::*;
pub use file_type::*;
pub use ingestion::*;
