use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{BalanceService, EntryView, ExpenseSummary};
use crate::domain::format_amount;
use crate::storage::BalanceStore;

/// Snapshot of every entry, with derived expenses, for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<EntryView>,
}

/// Exporter for writing balance data to CSV or JSON
pub struct Exporter<'a, S> {
    service: &'a BalanceService<S>,
}

impl<'a, S: BalanceStore> Exporter<'a, S> {
    pub fn new(service: &'a BalanceService<S>) -> Self {
        Self { service }
    }

    /// Export all entries to CSV, oldest first
    pub async fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.list_all().await?;
        let views = self.service.annotate(entries).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "balance",
            "description",
            "daily_expense",
            "created_at",
            "updated_at",
        ])?;

        for view in &views {
            let record = &view.record;
            csv_writer.write_record([
                record.id.to_string(),
                record.date.to_string(),
                format_amount(record.balance),
                record.description.clone().unwrap_or_default(),
                view.daily_expense.map(format_amount).unwrap_or_default(),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(views.len())
    }

    /// Export all entries as a JSON snapshot
    pub async fn export_entries_json<W: Write>(&self, mut writer: W) -> Result<EntrySnapshot> {
        let entries = self.service.list_all().await?;
        let snapshot = EntrySnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            entries: self.service.annotate(entries).await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// Write a summary's daily breakdown as CSV
pub fn write_summary_csv<W: Write>(summary: &ExpenseSummary, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["date", "balance", "expense", "description"])?;

    for day in &summary.daily_breakdown {
        csv_writer.write_record([
            day.date.to_string(),
            format_amount(day.balance),
            day.expense.map(format_amount).unwrap_or_default(),
            day.description.clone().unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(summary.daily_breakdown.len())
}

/// Write a summary as pretty-printed JSON
pub fn write_summary_json<W: Write>(summary: &ExpenseSummary, mut writer: W) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
