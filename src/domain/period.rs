use chrono::{Datelike, NaiveDate};

/// First and last day of a calendar month, both inclusive.
/// Returns `None` for an out-of-range month or year.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let end = next_month.pred_opt()?;
    Some((start, end))
}

/// Parse a "YYYY-MM" month string into (year, month).
pub fn parse_month(input: &str) -> Option<(i32, u32)> {
    let (year, month) = input.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

/// The calendar month containing `date`, as (year, month).
pub fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
