//! Extension-based dispatch between the image and audio/video extractors

use async_trait::async_trait;
use cardvault_core::{FileKind, FileType, IngestError, IngestResult};
use std::path::Path;
use std::sync::Arc;

use crate::image::ImageExtractor;
use crate::media::{FfprobeProbe, MediaExtractor};
use crate::metadata::ExtractedMetadata;
use crate::traits::{ContainerProbe, MetadataExtractor};

/// Routes a file to the extractor for its kind. Anything outside the known
/// extensions is rejected with [`IngestError::UnsupportedType`].
#[derive(Clone)]
pub struct MetadataDispatcher {
    image: Arc<dyn MetadataExtractor>,
    media: Arc<dyn MetadataExtractor>,
}

impl MetadataDispatcher {
    pub fn new(image: Arc<dyn MetadataExtractor>, media: Arc<dyn MetadataExtractor>) -> Self {
        Self { image, media }
    }

    /// EXIF for images, the given probe for audio/video.
    pub fn with_probe(probe: Arc<dyn ContainerProbe>) -> Self {
        Self::new(
            Arc::new(ImageExtractor),
            Arc::new(MediaExtractor::new(probe)),
        )
    }

    /// Default wiring with an ffprobe binary.
    pub fn with_ffprobe(ffprobe: FfprobeProbe) -> Self {
        Self::with_probe(Arc::new(ffprobe))
    }
}

#[async_trait]
impl MetadataExtractor for MetadataDispatcher {
    async fn extract(&self, path: &Path) -> IngestResult<ExtractedMetadata> {
        let file_type = FileType::from_path(path).ok_or_else(|| {
            IngestError::UnsupportedType(
                path.extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )
        })?;

        match file_type.kind() {
            FileKind::Image => self.image.extract(path).await,
            FileKind::AudioVideo => self.media.extract(path).await,
        }
    }
}
