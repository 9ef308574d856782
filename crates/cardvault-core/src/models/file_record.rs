use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::file_type::FileType;

/// Indexed archive entry. `backup_path` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub original_name: String,
    pub file_type: FileType,
    /// Relative to the archive root, always `/`-separated.
    pub backup_path: String,
    pub metadata: JsonValue,
    pub created_at: NaiveDate,
}

/// A record ready for insertion; built only after the archive copy exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFileRecord {
    pub original_name: String,
    pub file_type: FileType,
    pub backup_path: String,
    pub metadata: JsonValue,
    pub created_at: NaiveDate,
}

impl NewFileRecord {
    pub fn into_record(self, id: i64) -> FileRecord {
        FileRecord {
            id,
            original_name: self.original_name,
            file_type: self.file_type,
            backup_path: self.backup_path,
            metadata: self.metadata,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_created_at_serializes_as_calendar_date() {
        let record = NewFileRecord {
            original_name: "clip.avi".to_string(),
            file_type: FileType::Avi,
            backup_path: "2024/03/05/clip.avi".to_string(),
            metadata: json!({"format_name": "avi"}),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        }
        .into_record(7);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["file_type"], "avi");
        assert_eq!(json["created_at"], "2024-03-05");
        assert_eq!(json["metadata"]["format_name"], "avi");
    }
}
