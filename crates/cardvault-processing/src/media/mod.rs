//! Audio/video metadata module
//!
//! Container metadata comes from an external prober (ffprobe by default);
//! only the `format` section is kept.

pub mod extractor;
pub mod probe;

pub use extractor::MediaExtractor;
pub use probe::FfprobeProbe;
