use std::future::Future;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{BalanceRecord, EntryId, SortOrder};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("An entry already exists for {0}")]
    DateTaken(NaiveDate),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence boundary for balance entries.
///
/// Implementations own the record set. Range and ordering semantics are part of
/// the contract: every list comes back sorted by date, ranges are inclusive on
/// both ends, and an inverted range yields nothing. `save` must refuse to give
/// two records the same date, even under concurrent writers.
pub trait BalanceStore: Send + Sync {
    fn get_by_id(&self, id: EntryId)
    -> impl Future<Output = StoreResult<Option<BalanceRecord>>> + Send;

    fn get_by_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = StoreResult<Option<BalanceRecord>>> + Send;

    fn exists_by_date(&self, date: NaiveDate) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Records with `start <= date <= end`, ascending by date.
    fn get_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = StoreResult<Vec<BalanceRecord>>> + Send;

    fn count_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = StoreResult<usize>> + Send;

    fn get_all(&self, order: SortOrder)
    -> impl Future<Output = StoreResult<Vec<BalanceRecord>>> + Send;

    fn count_all(&self) -> impl Future<Output = StoreResult<usize>> + Send;

    fn get_latest(&self) -> impl Future<Output = StoreResult<Option<BalanceRecord>>> + Send;

    fn get_earliest(&self) -> impl Future<Output = StoreResult<Option<BalanceRecord>>> + Send;

    /// Insert a new record or overwrite the one with the same id.
    /// `created_at` of an existing record is never changed.
    fn save(
        &self,
        record: BalanceRecord,
    ) -> impl Future<Output = StoreResult<BalanceRecord>> + Send;

    /// Returns false if no record had this id.
    fn delete_by_id(&self, id: EntryId) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Returns the number of records removed.
    fn delete_all(&self) -> impl Future<Output = StoreResult<u64>> + Send;
}
