mod common;

use anyhow::Result;
use common::{parse_date, seed, seed_three_days, test_service};
use dayspend::BalanceService;
use dayspend::application::{AppError, ExpenseSummary};

#[tokio::test]
async fn test_daily_expense_three_day_scenario() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed_three_days(&service).await?;

    assert_eq!(service.daily_expense(parse_date("2024-01-01")).await?, None);
    assert_eq!(
        service.daily_expense(parse_date("2024-01-02")).await?,
        Some(20.0)
    );
    // Balance rose, so nothing was spent
    assert_eq!(
        service.daily_expense(parse_date("2024-01-03")).await?,
        Some(0.0)
    );

    Ok(())
}

#[tokio::test]
async fn test_daily_expense_absent_without_both_days() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed(&service, &[("2024-01-01", 100.0), ("2024-01-03", 60.0)]).await?;

    // Gap on the 2nd: no carry-forward from the 1st
    assert_eq!(service.daily_expense(parse_date("2024-01-03")).await?, None);
    // No entry on the day itself
    assert_eq!(service.daily_expense(parse_date("2024-01-02")).await?, None);
    assert_eq!(service.daily_expense(parse_date("2023-12-31")).await?, None);

    Ok(())
}

#[tokio::test]
async fn test_daily_expense_never_negative() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed(
        &service,
        &[
            ("2024-04-01", 10.0),
            ("2024-04-02", 500.0),
            ("2024-04-03", 500.0),
            ("2024-04-04", 0.0),
        ],
    )
    .await?;

    assert_eq!(service.daily_expense(parse_date("2024-04-02")).await?, Some(0.0));
    assert_eq!(service.daily_expense(parse_date("2024-04-03")).await?, Some(0.0));
    assert_eq!(
        service.daily_expense(parse_date("2024-04-04")).await?,
        Some(500.0)
    );

    Ok(())
}

#[tokio::test]
async fn test_summary_three_day_scenario() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed_three_days(&service).await?;

    let summary = service
        .summarize(parse_date("2024-01-01"), parse_date("2024-01-03"))
        .await?;

    assert_eq!(summary.start_date, parse_date("2024-01-01"));
    assert_eq!(summary.end_date, parse_date("2024-01-03"));
    assert_eq!(summary.opening_balance, 100.0);
    assert_eq!(summary.closing_balance, 95.0);
    assert_eq!(summary.total_expenses, 20.0);
    assert_eq!(summary.days_with_expenses, 1);
    assert_eq!(summary.average_daily_expense, 20.0);
    assert_eq!(summary.total_days, 3);

    assert_eq!(summary.daily_breakdown.len(), 3);
    assert_eq!(summary.daily_breakdown[0].expense, None);
    assert_eq!(summary.daily_breakdown[1].expense, Some(20.0));
    assert_eq!(summary.daily_breakdown[1].balance, 80.0);
    assert_eq!(summary.daily_breakdown[2].expense, Some(0.0));

    Ok(())
}

#[tokio::test]
async fn test_summary_of_empty_range_is_zeroed() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed_three_days(&service).await?;

    let summary = service
        .summarize(parse_date("2025-01-01"), parse_date("2025-01-31"))
        .await?;
    assert_eq!(
        summary,
        ExpenseSummary::empty(parse_date("2025-01-01"), parse_date("2025-01-31"))
    );

    Ok(())
}

#[tokio::test]
async fn test_summary_of_inverted_range_is_zeroed() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed_three_days(&service).await?;

    let summary = service
        .summarize(parse_date("2024-01-03"), parse_date("2024-01-01"))
        .await?;
    assert_eq!(summary.total_days, 0);
    assert_eq!(summary.total_expenses, 0.0);
    assert_eq!(summary.opening_balance, 0.0);
    assert!(summary.daily_breakdown.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_summary_opening_balance_is_first_entry_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed(
        &service,
        &[
            ("2024-05-09", 1000.0),
            ("2024-05-10", 900.0),
            ("2024-05-11", 850.0),
        ],
    )
    .await?;

    // Range starts before any entry and ends after the last one
    let summary = service
        .summarize(parse_date("2024-05-01"), parse_date("2024-05-31"))
        .await?;
    assert_eq!(summary.opening_balance, 1000.0);
    assert_eq!(summary.closing_balance, 850.0);

    // Starting mid-series: the first day's expense still looks at the day before
    let summary = service
        .summarize(parse_date("2024-05-10"), parse_date("2024-05-11"))
        .await?;
    assert_eq!(summary.opening_balance, 900.0);
    assert_eq!(summary.daily_breakdown[0].expense, Some(100.0));
    assert_eq!(summary.total_expenses, 150.0);
    assert_eq!(summary.days_with_expenses, 2);
    assert_eq!(summary.average_daily_expense, 75.0);

    Ok(())
}

#[tokio::test]
async fn test_month_summary_counts_entries_not_calendar_days() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed(
        &service,
        &[
            ("2024-06-01", 400.0),
            ("2024-06-02", 370.0),
            ("2024-06-10", 300.0),
            ("2024-06-11", 310.0),
            ("2024-06-30", 250.0),
        ],
    )
    .await?;

    let summary = service.summarize_month(2024, 6).await?;
    assert_eq!(summary.start_date, parse_date("2024-06-01"));
    assert_eq!(summary.end_date, parse_date("2024-06-30"));
    assert_eq!(summary.total_days, 5);
    assert_eq!(summary.days_with_expenses, 1);
    assert_eq!(summary.total_expenses, 30.0);
    assert_eq!(summary.average_daily_expense, 30.0);

    Ok(())
}

#[tokio::test]
async fn test_month_summary_rejects_invalid_month() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let result = service.summarize_month(2024, 13).await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    Ok(())
}

#[tokio::test]
async fn test_summary_is_idempotent() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed(
        &service,
        &[
            ("2024-07-01", 120.0),
            ("2024-07-02", 99.5),
            ("2024-07-03", 42.25),
            ("2024-07-05", 40.0),
        ],
    )
    .await?;

    let first = service.summarize_month(2024, 7).await?;
    let second = service.summarize_month(2024, 7).await?;
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn test_summary_reflects_updates() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed_three_days(&service).await?;

    let middle = service.get_by_date(parse_date("2024-01-02")).await?.unwrap();
    service
        .update(middle.id, middle.date, 60.0, middle.description.clone())
        .await?;

    let summary = service
        .summarize(parse_date("2024-01-01"), parse_date("2024-01-03"))
        .await?;
    assert_eq!(summary.total_expenses, 40.0);
    assert_eq!(summary.days_with_expenses, 1);

    Ok(())
}

#[tokio::test]
async fn test_summary_across_year_ten_thousand_matches_memory_store() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let memory = BalanceService::in_memory();
    let last_day = chrono::NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
    let next_day = chrono::NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();

    // Inserted newest first so ordering comes from the store, not insertion
    service.create(next_day, 60.0, None).await?;
    service.create(last_day, 100.0, None).await?;
    memory.create(next_day, 60.0, None).await?;
    memory.create(last_day, 100.0, None).await?;

    let on_disk = service.summarize(last_day, next_day).await?;
    let in_memory = memory.summarize(last_day, next_day).await?;
    assert_eq!(on_disk.total_days, 2);
    assert_eq!(on_disk.total_expenses, 40.0);
    assert_eq!(on_disk.total_days, in_memory.total_days);
    assert_eq!(on_disk.total_expenses, in_memory.total_expenses);
    assert_eq!(on_disk.closing_balance, 60.0);

    assert_eq!(service.daily_expense(next_day).await?, Some(40.0));
    let latest = service.overview().await?.latest.map(|r| r.date);
    assert_eq!(latest, Some(next_day));

    Ok(())
}
