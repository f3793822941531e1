use chrono::NaiveDate;

use super::Amount;

/// The expense for a day given the previous day's balance and the day's own balance.
/// Expense = previous - current, clamped at zero: a rising balance is not spending.
pub fn derive_expense(previous_balance: Amount, current_balance: Amount) -> Amount {
    let expense = previous_balance - current_balance;
    if expense > 0.0 { expense } else { 0.0 }
}

/// The calendar day before `date`. `None` only at the lower bound of the date range.
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Average expense over the days that actually had spending.
pub fn average_expense(total: Amount, days_with_expenses: usize) -> Amount {
    if days_with_expenses > 0 {
        total / days_with_expenses as f64
    } else {
        0.0
    }
}
