//! Audio/video extractor over a [`ContainerProbe`]

use async_trait::async_trait;
use cardvault_core::{IngestError, IngestResult};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;

use crate::fs_time::filesystem_creation_time;
use crate::metadata::{DateSource, ExtractedMetadata};
use crate::traits::{ContainerProbe, MetadataExtractor};

/// Timestamp layouts some muxers write without an offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub struct MediaExtractor {
    probe: Arc<dyn ContainerProbe>,
}

impl MediaExtractor {
    pub fn new(probe: Arc<dyn ContainerProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl MetadataExtractor for MediaExtractor {
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> IngestResult<ExtractedMetadata> {
        if let Err(e) = tokio::fs::metadata(path).await {
            return Err(IngestError::io(path, e));
        }

        let format = self.probe.probe_format(path).await.map_err(|e| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            IngestError::parse(name, format!("{:#}", e))
        })?;

        let (created, date_source) = match container_creation_time(&format) {
            Some(created) => (created, DateSource::ContainerTag),
            None => (
                filesystem_creation_time(path).await.naive_utc(),
                DateSource::Filesystem,
            ),
        };

        tracing::debug!(created = %created, date_source = ?date_source, "Container metadata extracted");

        Ok(ExtractedMetadata {
            tags: format,
            created,
            date_source,
        })
    }
}

/// `format.tags.creation_time`, normalised to UTC.
pub(crate) fn container_creation_time(format: &JsonValue) -> Option<NaiveDateTime> {
    let raw = format.get("tags")?.get("creation_time")?.as_str()?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
