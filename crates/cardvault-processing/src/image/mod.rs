//! Image metadata module
//!
//! JPEG files are read through their EXIF segment.

pub mod exif;

pub use self::exif::ImageExtractor;
