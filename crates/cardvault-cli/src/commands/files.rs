use anyhow::{anyhow, Result};
use cardvault_core::{FileRecord, FileType};
use cardvault_db::FileIndex;
use chrono::NaiveDate;

use super::output::print_records;
use crate::cli::FilesArgs;

pub async fn run(index: &dyn FileIndex, args: &FilesArgs) -> Result<()> {
    let (start, end) = args
        .range()
        .ok_or_else(|| anyhow!("Specify --date, or both --from and --to"))?;
    let records = fetch(index, start, end, &args.types).await?;
    print_records(&records, args.format)
}

/// No type filter means every type; a filter goes through the typed query.
pub async fn fetch(
    index: &dyn FileIndex,
    start: NaiveDate,
    end: NaiveDate,
    types: &[FileType],
) -> Result<Vec<FileRecord>> {
    let records = if !types.is_empty() {
        index
            .query_by_date_range_and_types(start, end, types)
            .await?
    } else if start == end {
        index.query_by_date(start).await?
    } else {
        index.query_by_date_range(start, end).await?
    };
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardvault_core::NewFileRecord;
    use cardvault_db::SqliteFileIndex;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded() -> (tempfile::TempDir, SqliteFileIndex) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("metadata.db").display());
        let index = SqliteFileIndex::connect(&url, 1).await.unwrap();
        for (name, file_type, day) in [
            ("a.jpg", FileType::Jpg, 1),
            ("b.wav", FileType::Wav, 2),
            ("c.avi", FileType::Avi, 2),
        ] {
            let created_at = date(2024, 3, day);
            index
                .insert(&NewFileRecord {
                    original_name: name.to_string(),
                    file_type,
                    backup_path: format!("2024/03/{:02}/{}", day, name),
                    metadata: json!({}),
                    created_at,
                })
                .await
                .unwrap();
        }
        (dir, index)
    }

    fn names(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.original_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_single_day() {
        let (_dir, index) = seeded().await;
        let records = fetch(&index, date(2024, 3, 2), date(2024, 3, 2), &[])
            .await
            .unwrap();
        assert_eq!(names(&records), ["b.wav", "c.avi"]);
    }

    #[tokio::test]
    async fn test_fetch_range_with_types() {
        let (_dir, index) = seeded().await;
        let records = fetch(
            &index,
            date(2024, 3, 1),
            date(2024, 3, 31),
            &[FileType::Jpg, FileType::Avi],
        )
        .await
        .unwrap();
        assert_eq!(names(&records), ["a.jpg", "c.avi"]);
    }
}
