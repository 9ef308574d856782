//! Cardvault Processing Library
//!
//! Metadata extraction for archived media: EXIF for images, a container
//! probe for audio and video, and the file-system timestamp as the last
//! resort for both.

pub mod dispatcher;
pub mod fs_time;
pub mod image;
pub mod media;
pub mod metadata;
pub mod traits;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use dispatcher::MetadataDispatcher;
pub use fs_time::filesystem_creation_time;
pub use image::ImageExtractor;
pub use media::{FfprobeProbe, MediaExtractor};
pub use metadata::{DateSource, ExtractedMetadata};
pub use traits::{ContainerProbe, MetadataExtractor};
