use async_trait::async_trait;
use cardvault_core::{FileRecord, FileType, NewFileRecord};
use chrono::NaiveDate;

use super::error::IndexResult;

/// Metadata index
///
/// Range and date queries return records ordered by `created_at` ascending
/// (ties broken by id). Date ranges are inclusive on both ends.
#[async_trait]
pub trait FileIndex: Send + Sync {
    /// Insert a record and return its id.
    ///
    /// Fails with [`IndexError::Conflict`](super::IndexError::Conflict) when
    /// the record's `backup_path` is already present.
    async fn insert(&self, record: &NewFileRecord) -> IndexResult<i64>;

    async fn query_by_date(&self, date: NaiveDate) -> IndexResult<Vec<FileRecord>>;

    async fn query_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> IndexResult<Vec<FileRecord>>;

    /// An empty `types` slice yields an empty result.
    async fn query_by_date_range_and_types(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        types: &[FileType],
    ) -> IndexResult<Vec<FileRecord>>;

    async fn query_by_id(&self, id: i64) -> IndexResult<FileRecord>;
}
