use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{average_expense, month_bounds};
use crate::storage::BalanceStore;

use super::{AppError, DailyExpense, ExpenseCalculator, ExpenseSummary};

/// Builds expense summaries over the entries stored in a date range.
pub struct SummaryAggregator<'a, S> {
    store: &'a S,
    calculator: ExpenseCalculator<'a, S>,
}

impl<'a, S: BalanceStore> SummaryAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            calculator: ExpenseCalculator::new(store),
        }
    }

    /// Summarize the entries with `start <= date <= end`.
    ///
    /// Opening and closing balances come from the first and last entry actually
    /// found, which need not sit on `start` or `end`. Each day's expense looks at
    /// the calendar day before it, even when that day lies outside the range.
    /// An empty or inverted range yields [`ExpenseSummary::empty`].
    pub async fn summarize(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ExpenseSummary, AppError> {
        let entries = self.store.get_by_range(start, end).await?;

        let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
            debug!(%start, %end, "no entries in range");
            return Ok(ExpenseSummary::empty(start, end));
        };

        let mut total_expenses = 0.0;
        let mut days_with_expenses = 0;
        let mut daily_breakdown = Vec::with_capacity(entries.len());

        for entry in &entries {
            let expense = self.calculator.daily_expense(entry.date).await?;

            if let Some(spent) = expense.filter(|e| *e > 0.0) {
                total_expenses += spent;
                days_with_expenses += 1;
            }

            daily_breakdown.push(DailyExpense {
                date: entry.date,
                balance: entry.balance,
                expense,
                description: entry.description.clone(),
            });
        }

        debug!(
            %start,
            %end,
            entries = entries.len(),
            days_with_expenses,
            "summarized range"
        );

        Ok(ExpenseSummary {
            start_date: start,
            end_date: end,
            opening_balance: first.balance,
            closing_balance: last.balance,
            total_expenses,
            average_daily_expense: average_expense(total_expenses, days_with_expenses),
            total_days: entries.len(),
            days_with_expenses,
            daily_breakdown,
        })
    }

    /// Summarize a whole calendar month.
    pub async fn summarize_month(&self, year: i32, month: u32) -> Result<ExpenseSummary, AppError> {
        let (start, end) = month_bounds(year, month)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid month: {}-{:02}", year, month)))?;
        self.summarize(start, end).await
    }
}
