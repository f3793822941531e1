use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Amount, derive_expense, previous_day};
use crate::storage::BalanceStore;

use super::AppError;

/// Derives a day's expense from the stored balances of that day and the day before.
pub struct ExpenseCalculator<'a, S> {
    store: &'a S,
}

impl<'a, S: BalanceStore> ExpenseCalculator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// `None` unless both `date` and the calendar day before it have an entry.
    /// Gaps are never bridged.
    pub async fn daily_expense(&self, date: NaiveDate) -> Result<Option<Amount>, AppError> {
        let Some(previous_date) = previous_day(date) else {
            return Ok(None);
        };

        let Some(current) = self.store.get_by_date(date).await? else {
            return Ok(None);
        };
        let Some(previous) = self.store.get_by_date(previous_date).await? else {
            debug!(%date, "no entry for previous day, expense not derivable");
            return Ok(None);
        };

        Ok(Some(derive_expense(previous.balance, current.balance)))
    }
}
