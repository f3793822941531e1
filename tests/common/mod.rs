// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use dayspend::BalanceService;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BalanceService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BalanceService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Record a series of (date, balance) entries
pub async fn seed(service: &BalanceService, entries: &[(&str, f64)]) -> Result<()> {
    for (date, balance) in entries {
        service.create(parse_date(date), *balance, None).await?;
    }
    Ok(())
}

/// The three-day example: spend 20, then a deposit
pub async fn seed_three_days(service: &BalanceService) -> Result<()> {
    seed(
        service,
        &[("2024-01-01", 100.0), ("2024-01-02", 80.0), ("2024-01-03", 95.0)],
    )
    .await
}
