use anyhow::{bail, Result};
use cardvault_core::FileRecord;
use cardvault_db::{FileIndex, IndexError};
use cardvault_storage::BackupStore;
use serde::Serialize;
use std::path::PathBuf;

use super::output::print_detail;
use crate::cli::OutputFormat;

/// A record plus the state of its archive copy
#[derive(Debug, Serialize)]
pub struct RecordDetail {
    #[serde(flatten)]
    pub record: FileRecord,
    pub archive_path: PathBuf,
    pub present: bool,
}

pub async fn lookup(
    index: &dyn FileIndex,
    archive: &dyn BackupStore,
    id: i64,
) -> Result<RecordDetail> {
    let record = match index.query_by_id(id).await {
        Ok(record) => record,
        Err(IndexError::NotFound(_)) => bail!("No indexed file with id {}", id),
        Err(e) => return Err(e.into()),
    };

    let archive_path = archive.resolve(&record.backup_path)?;
    let present = archive.exists(&record.backup_path).await?;

    Ok(RecordDetail {
        record,
        archive_path,
        present,
    })
}

pub async fn run(
    index: &dyn FileIndex,
    archive: &dyn BackupStore,
    id: i64,
    format: OutputFormat,
) -> Result<()> {
    let detail = lookup(index, archive, id).await?;
    print_detail(&detail, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardvault_core::{FileType, NewFileRecord};
    use cardvault_db::SqliteFileIndex;
    use cardvault_storage::LocalArchive;
    use chrono::NaiveDate;
    use serde_json::json;

    async fn fixture() -> (tempfile::TempDir, SqliteFileIndex, LocalArchive, i64) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("metadata.db").display());
        let index = SqliteFileIndex::connect(&url, 1).await.unwrap();
        let archive = LocalArchive::new(dir.path().join("backup")).await.unwrap();

        let source = dir.path().join("clip.avi");
        std::fs::write(&source, b"avi").unwrap();
        let stored = archive.store(&source, "2024/03/05/clip.avi").await.unwrap();

        let id = index
            .insert(&NewFileRecord {
                original_name: "clip.avi".to_string(),
                file_type: FileType::Avi,
                backup_path: stored.relative_path,
                metadata: json!({"format_name": "avi"}),
                created_at: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            })
            .await
            .unwrap();

        (dir, index, archive, id)
    }

    #[tokio::test]
    async fn test_lookup_resolves_archive_copy() {
        let (_dir, index, archive, id) = fixture().await;

        let detail = lookup(&index, &archive, id).await.unwrap();
        assert_eq!(detail.record.id, id);
        assert_eq!(detail.record.original_name, "clip.avi");
        assert!(detail.archive_path.starts_with(archive.root()));
        assert!(detail.archive_path.ends_with("2024/03/05/clip.avi"));
        assert!(detail.present);
    }

    #[tokio::test]
    async fn test_lookup_reports_missing_copy() {
        let (_dir, index, archive, id) = fixture().await;
        std::fs::remove_file(archive.resolve("2024/03/05/clip.avi").unwrap()).unwrap();

        let detail = lookup(&index, &archive, id).await.unwrap();
        assert!(!detail.present);
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_error() {
        let (_dir, index, archive, id) = fixture().await;

        let err = lookup(&index, &archive, id + 100).await.unwrap_err();
        assert!(err.to_string().contains("No indexed file with id"));

        let err = run(&index, &archive, id + 100, OutputFormat::Json)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(&format!("{}", id + 100)));
    }
}
