//! Core traits for metadata extraction
//!
//! This module defines the interface shared by the image and audio/video
//! extractors, and the black-box container probe the latter relies on.

use async_trait::async_trait;
use cardvault_core::IngestResult;
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::metadata::ExtractedMetadata;

/// Metadata extractor - reads embedded tags and resolves a creation date
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extract the tag blob and creation date of the file at `path`.
    ///
    /// Falls back to the file-system timestamp when the file carries no
    /// usable date; only unreadable or corrupt files produce an error.
    async fn extract(&self, path: &Path) -> IngestResult<ExtractedMetadata>;
}

/// Container/stream prober for audio and video files
#[async_trait]
pub trait ContainerProbe: Send + Sync {
    /// Return the container's format section (not the stream tree).
    async fn probe_format(&self, path: &Path) -> Result<JsonValue, anyhow::Error>;
}
