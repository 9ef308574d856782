use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

/// Supported file type, named after the lowercase extension without the dot.
///
/// Add a variant here (and to [`FileType::ALL`]) to make a new extension
/// ingestible; [`FileType::kind`] decides which extractor handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Jpeg,
    Jpg,
    Avi,
    Wav,
}

/// Extractor family a file type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Still images carrying EXIF tags
    Image,
    /// Audio or video containers read through a stream probe
    AudioVideo,
}

impl FileType {
    pub const ALL: [FileType; 4] = [FileType::Jpeg, FileType::Jpg, FileType::Avi, FileType::Wav];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Jpeg => "jpeg",
            FileType::Jpg => "jpg",
            FileType::Avi => "avi",
            FileType::Wav => "wav",
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            FileType::Jpeg | FileType::Jpg => FileKind::Image,
            FileType::Avi | FileType::Wav => FileKind::AudioVideo,
        }
    }

    /// Detect the type from a path's extension, case-insensitively.
    /// Returns `None` for missing or unsupported extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for FileType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" => Ok(FileType::Jpeg),
            "jpg" => Ok(FileType::Jpg),
            "avi" => Ok(FileType::Avi),
            "wav" => Ok(FileType::Wav),
            _ => Err(anyhow::anyhow!("Unsupported file type: {}", s)),
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_str() {
        assert_eq!("jpg".parse::<FileType>().unwrap(), FileType::Jpg);
        assert_eq!("JPEG".parse::<FileType>().unwrap(), FileType::Jpeg);
        assert_eq!("Avi".parse::<FileType>().unwrap(), FileType::Avi);
        assert_eq!("wav".parse::<FileType>().unwrap(), FileType::Wav);

        assert!("png".parse::<FileType>().is_err());
        assert!("".parse::<FileType>().is_err());
    }

    #[test]
    fn test_file_type_from_path() {
        assert_eq!(
            FileType::from_path(Path::new("/card/DCIM/IMG_0001.JPG")),
            Some(FileType::Jpg)
        );
        assert_eq!(
            FileType::from_path(Path::new("clip.avi")),
            Some(FileType::Avi)
        );
        assert_eq!(FileType::from_path(Path::new("shot.png")), None);
        assert_eq!(FileType::from_path(Path::new("README")), None);
        assert_eq!(FileType::from_path(Path::new("archive.tar.jpg")), Some(FileType::Jpg));
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileType::Jpeg.kind(), FileKind::Image);
        assert_eq!(FileType::Jpg.kind(), FileKind::Image);
        assert_eq!(FileType::Avi.kind(), FileKind::AudioVideo);
        assert_eq!(FileType::Wav.kind(), FileKind::AudioVideo);
    }

    #[test]
    fn test_display_matches_serde() {
        for file_type in FileType::ALL {
            let json = serde_json::to_string(&file_type).unwrap();
            assert_eq!(json, format!("\"{}\"", file_type));
        }
    }
}
