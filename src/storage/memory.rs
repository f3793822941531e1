use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{BalanceRecord, EntryId, SortOrder};

use super::{BalanceStore, StoreError, StoreResult};

#[derive(Default)]
struct Records {
    by_id: HashMap<EntryId, BalanceRecord>,
    by_date: BTreeMap<NaiveDate, EntryId>,
}

impl Records {
    fn in_date_order(&self) -> impl DoubleEndedIterator<Item = &BalanceRecord> {
        self.by_date.values().filter_map(|id| self.by_id.get(id))
    }
}

/// Process-local balance store. Nothing survives a restart.
/// The date check and the write happen under one lock, so uniqueness holds
/// for concurrent callers.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceStore for MemoryStore {
    async fn get_by_id(&self, id: EntryId) -> StoreResult<Option<BalanceRecord>> {
        Ok(self.records.read().await.by_id.get(&id).cloned())
    }

    async fn get_by_date(&self, date: NaiveDate) -> StoreResult<Option<BalanceRecord>> {
        let records = self.records.read().await;
        Ok(records
            .by_date
            .get(&date)
            .and_then(|id| records.by_id.get(id))
            .cloned())
    }

    async fn exists_by_date(&self, date: NaiveDate) -> StoreResult<bool> {
        Ok(self.records.read().await.by_date.contains_key(&date))
    }

    async fn get_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<BalanceRecord>> {
        if start > end {
            return Ok(Vec::new());
        }
        let records = self.records.read().await;
        Ok(records
            .by_date
            .range(start..=end)
            .filter_map(|(_, id)| records.by_id.get(id))
            .cloned()
            .collect())
    }

    async fn count_by_range(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<usize> {
        if start > end {
            return Ok(0);
        }
        Ok(self.records.read().await.by_date.range(start..=end).count())
    }

    async fn get_all(&self, order: SortOrder) -> StoreResult<Vec<BalanceRecord>> {
        let records = self.records.read().await;
        let all = match order {
            SortOrder::Ascending => records.in_date_order().cloned().collect(),
            SortOrder::Descending => records.in_date_order().rev().cloned().collect(),
        };
        Ok(all)
    }

    async fn count_all(&self) -> StoreResult<usize> {
        Ok(self.records.read().await.by_id.len())
    }

    async fn get_latest(&self) -> StoreResult<Option<BalanceRecord>> {
        Ok(self.records.read().await.in_date_order().next_back().cloned())
    }

    async fn get_earliest(&self) -> StoreResult<Option<BalanceRecord>> {
        Ok(self.records.read().await.in_date_order().next().cloned())
    }

    async fn save(&self, mut record: BalanceRecord) -> StoreResult<BalanceRecord> {
        let mut records = self.records.write().await;

        if let Some(owner) = records.by_date.get(&record.date) {
            if *owner != record.id {
                return Err(StoreError::DateTaken(record.date));
            }
        }

        let previous = records
            .by_id
            .get(&record.id)
            .map(|existing| (existing.created_at, existing.date));
        if let Some((created_at, previous_date)) = previous {
            record.created_at = created_at;
            records.by_date.remove(&previous_date);
        }

        records.by_date.insert(record.date, record.id);
        records.by_id.insert(record.id, record.clone());
        debug!(id = %record.id, date = %record.date, "saved balance entry");

        Ok(record)
    }

    async fn delete_by_id(&self, id: EntryId) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        match records.by_id.remove(&id) {
            Some(removed) => {
                records.by_date.remove(&removed.date);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut records = self.records.write().await;
        let removed = records.by_id.len() as u64;
        records.by_id.clear();
        records.by_date.clear();
        Ok(removed)
    }
}
