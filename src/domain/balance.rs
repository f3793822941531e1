use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

pub type EntryId = Uuid;

/// Direction used when listing entries by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A single end-of-day balance snapshot. At most one exists per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub id: EntryId,
    pub date: NaiveDate,
    pub balance: Amount,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BalanceRecord {
    pub fn new(date: NaiveDate, balance: Amount) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            balance,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns a copy carrying new date, balance and description.
    /// Identity and `created_at` are preserved, `updated_at` is refreshed.
    pub fn revised(
        &self,
        date: NaiveDate,
        balance: Amount,
        description: Option<String>,
    ) -> Self {
        Self {
            id: self.id,
            date,
            balance,
            description,
            created_at: self.created_at,
            updated_at: Utc::now().max(self.updated_at),
        }
    }
}
