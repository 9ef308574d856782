//! Extraction result types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Where the creation date of a file came from, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// EXIF `DateTimeOriginal`
    CaptureTag,
    /// EXIF `DateTimeDigitized`
    CreateTag,
    /// EXIF `DateTime`
    ModifyTag,
    /// Container `format.tags.creation_time`
    ContainerTag,
    /// File-system birth (or modification) time
    Filesystem,
}

/// Output of a metadata extractor: the verbatim tag blob plus the resolved
/// creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub tags: JsonValue,
    pub created: NaiveDateTime,
    pub date_source: DateSource,
}

impl ExtractedMetadata {
    /// Creation timestamp truncated to the calendar day.
    pub fn creation_date(&self) -> NaiveDate {
        self.created.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_creation_date_truncates_time() {
        let metadata = ExtractedMetadata {
            tags: json!({}),
            created: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
            date_source: DateSource::ModifyTag,
        };
        assert_eq!(
            metadata.creation_date(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_date_source_serialization() {
        let json = serde_json::to_string(&DateSource::ContainerTag).unwrap();
        assert_eq!(json, "\"container_tag\"");
    }
}
