use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, BalanceRecord};

/// Expense report over a date range. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub opening_balance: Amount,
    pub closing_balance: Amount,
    pub total_expenses: Amount,
    pub average_daily_expense: Amount,
    /// Number of stored entries in the range, not the calendar span.
    pub total_days: usize,
    pub days_with_expenses: usize,
    pub daily_breakdown: Vec<DailyExpense>,
}

impl ExpenseSummary {
    /// The all-zero summary reported when a range holds no entries.
    pub fn empty(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            opening_balance: 0.0,
            closing_balance: 0.0,
            total_expenses: 0.0,
            average_daily_expense: 0.0,
            total_days: 0,
            days_with_expenses: 0,
            daily_breakdown: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyExpense {
    pub date: NaiveDate,
    pub balance: Amount,
    /// `None` when the previous calendar day has no entry.
    pub expense: Option<Amount>,
    pub description: Option<String>,
}

/// An entry together with its derived expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub record: BalanceRecord,
    pub daily_expense: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_entries: usize,
    pub earliest: Option<BalanceRecord>,
    pub latest: Option<BalanceRecord>,
}
