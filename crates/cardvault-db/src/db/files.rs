use async_trait::async_trait;
use cardvault_core::{FileRecord, FileType, NewFileRecord};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

use super::error::{IndexError, IndexResult};
use super::index::FileIndex;
use super::schema::ensure_schema;

const SELECT_FILES: &str =
    "SELECT id, original_name, file_type, backup_path, metadata, created_at FROM files";

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    id: i64,
    original_name: String,
    file_type: String,
    backup_path: String,
    metadata: String,
    created_at: NaiveDate,
}

impl TryFrom<FileRow> for FileRecord {
    type Error = IndexError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let file_type: FileType = row.file_type.parse().map_err(|e| {
            IndexError::Corrupt(format!("row {}: {}", row.id, e))
        })?;
        let metadata = serde_json::from_str(&row.metadata).map_err(|e| {
            IndexError::Corrupt(format!("row {}: invalid metadata JSON: {}", row.id, e))
        })?;

        Ok(FileRecord {
            id: row.id,
            original_name: row.original_name,
            file_type,
            backup_path: row.backup_path,
            metadata,
            created_at: row.created_at,
        })
    }
}

fn into_records(rows: Vec<FileRow>) -> IndexResult<Vec<FileRecord>> {
    rows.into_iter().map(FileRecord::try_from).collect()
}

/// Index backed by a SQLite `files` table
#[derive(Clone)]
pub struct SqliteFileIndex {
    pool: SqlitePool,
}

impl SqliteFileIndex {
    /// Open (creating if missing) the database at `database_url` and make
    /// sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> IndexResult<Self> {
        tracing::info!("Connecting to index database...");
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        ensure_schema(&pool).await?;
        tracing::info!(max_connections, "Index database ready");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl FileIndex for SqliteFileIndex {
    #[tracing::instrument(skip(self, record), fields(db.table = "files", db.operation = "insert", backup_path = %record.backup_path))]
    async fn insert(&self, record: &NewFileRecord) -> IndexResult<i64> {
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| IndexError::Corrupt(format!("unencodable metadata: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO files (original_name, file_type, backup_path, metadata, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.original_name)
        .bind(record.file_type.as_str())
        .bind(&record.backup_path)
        .bind(metadata)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(IndexError::Conflict {
                    backup_path: record.backup_path.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn query_by_date(&self, date: NaiveDate) -> IndexResult<Vec<FileRecord>> {
        let rows = sqlx::query_as::<Sqlite, FileRow>(&format!(
            "{} WHERE created_at = ? ORDER BY created_at, id",
            SELECT_FILES
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn query_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> IndexResult<Vec<FileRecord>> {
        let rows = sqlx::query_as::<Sqlite, FileRow>(&format!(
            "{} WHERE created_at BETWEEN ? AND ? ORDER BY created_at, id",
            SELECT_FILES
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", type_count = types.len()))]
    async fn query_by_date_range_and_types(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        types: &[FileType],
    ) -> IndexResult<Vec<FileRecord>> {
        if types.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_FILES);
        builder
            .push(" WHERE created_at BETWEEN ")
            .push_bind(start)
            .push(" AND ")
            .push_bind(end)
            .push(" AND file_type IN (");
        let mut separated = builder.separated(", ");
        for file_type in types {
            separated.push_bind(file_type.as_str());
        }
        separated.push_unseparated(") ORDER BY created_at, id");

        let rows = builder
            .build_query_as::<FileRow>()
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = id))]
    async fn query_by_id(&self, id: i64) -> IndexResult<FileRecord> {
        let row = sqlx::query_as::<Sqlite, FileRow>(&format!("{} WHERE id = ?", SELECT_FILES))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(IndexError::NotFound(id)),
        }
    }
}
