use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{Amount, BalanceRecord, EntryId};
use crate::storage::BalanceStore;

use super::AppError;

/// Outcome of recording a balance for a date that may already have one.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Created(BalanceRecord),
    Updated(BalanceRecord),
}

impl Recorded {
    pub fn into_record(self) -> BalanceRecord {
        match self {
            Recorded::Created(record) | Recorded::Updated(record) => record,
        }
    }
}

/// Create, update and delete entries while keeping one entry per date.
///
/// Balances are expected to be validated already (see `domain::parse_balance`).
/// The store has the final say on uniqueness: a concurrent writer that slips
/// past the existence check still surfaces as [`AppError::Conflict`].
pub struct EntryManager<'a, S> {
    store: &'a S,
}

impl<'a, S: BalanceStore> EntryManager<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        date: NaiveDate,
        balance: Amount,
        description: Option<String>,
    ) -> Result<BalanceRecord, AppError> {
        if self.store.exists_by_date(date).await? {
            warn!(%date, "rejected create: date already has an entry");
            return Err(AppError::Conflict(date));
        }

        let mut record = BalanceRecord::new(date, balance);
        if let Some(desc) = description {
            record = record.with_description(desc);
        }

        let saved = self.store.save(record).await?;
        info!(id = %saved.id, %date, balance, "created balance entry");
        Ok(saved)
    }

    /// Overwrite date, balance and description of an existing entry.
    /// Moving to a date held by another entry is a conflict.
    pub async fn update(
        &self,
        id: EntryId,
        date: NaiveDate,
        balance: Amount,
        description: Option<String>,
    ) -> Result<BalanceRecord, AppError> {
        let existing = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        if existing.date != date && self.store.exists_by_date(date).await? {
            warn!(%id, %date, "rejected update: date already has an entry");
            return Err(AppError::Conflict(date));
        }

        let saved = self
            .store
            .save(existing.revised(date, balance, description))
            .await?;
        info!(%id, %date, balance, "updated balance entry");
        Ok(saved)
    }

    /// Create the entry for `date`, or update it if one exists.
    pub async fn record(
        &self,
        date: NaiveDate,
        balance: Amount,
        description: Option<String>,
    ) -> Result<Recorded, AppError> {
        match self.store.get_by_date(date).await? {
            Some(existing) => {
                let updated = self.update(existing.id, date, balance, description).await?;
                Ok(Recorded::Updated(updated))
            }
            None => {
                let created = self.create(date, balance, description).await?;
                Ok(Recorded::Created(created))
            }
        }
    }

    pub async fn delete(&self, id: EntryId) -> Result<(), AppError> {
        if !self.store.delete_by_id(id).await? {
            return Err(AppError::NotFound(id.to_string()));
        }
        info!(%id, "deleted balance entry");
        Ok(())
    }

    /// Remove every entry. Returns how many were removed.
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_all().await?;
        info!(removed, "cleared all balance entries");
        Ok(removed)
    }
}
