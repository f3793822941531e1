use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Read;
use tracing::info;

use crate::application::{AppError, BalanceService};
use crate::domain::parse_balance;
use crate::storage::BalanceStore;

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    /// Leave existing entries alone instead of reporting a conflict.
    pub skip_duplicates: bool,
    /// Replace the balance of existing entries.
    pub overwrite: bool,
}

/// Importer for loading balance entries
pub struct Importer<'a, S> {
    service: &'a BalanceService<S>,
}

impl<'a, S: BalanceStore> Importer<'a, S> {
    pub fn new(service: &'a BalanceService<S>) -> Self {
        Self { service }
    }

    /// Import entries from CSV with `date` and `balance` columns and an optional
    /// `description` column. Columns are located by header name, so files written
    /// by the exporter can be read back directly.
    pub async fn import_entries_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers().context("Failed to read CSV header")?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let date_col = column("date").context("CSV is missing a 'date' column")?;
        let balance_col = column("balance").context("CSV is missing a 'balance' column")?;
        let description_col = column("description");

        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();
        let mut seen_dates = HashSet::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let date_str = record.get(date_col).unwrap_or("").trim();
            let balance_str = record.get(balance_col).unwrap_or("");
            let description = description_col
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                Ok(d) => d,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("date".to_string()),
                        error: format!("Invalid date '{}': {}", date_str, e),
                    });
                    continue;
                }
            };

            let balance = match parse_balance(balance_str) {
                Ok(b) => b,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("balance".to_string()),
                        error: format!("Invalid balance: {}", e),
                    });
                    continue;
                }
            };

            if !seen_dates.insert(date) {
                errors.push(ImportError {
                    line,
                    field: Some("date".to_string()),
                    error: format!("Date {} appears more than once in the file", date),
                });
                continue;
            }

            let outcome = if options.dry_run {
                self.preview(date, &options).await
            } else if options.overwrite {
                self.service
                    .record_balance(date, balance, description)
                    .await
                    .map(|_| ())
            } else {
                self.service
                    .create(date, balance, description)
                    .await
                    .map(|_| ())
            };

            match outcome {
                Ok(()) => imported += 1,
                Err(AppError::Conflict(_)) if options.skip_duplicates => skipped += 1,
                Err(e) => errors.push(ImportError {
                    line,
                    field: None,
                    error: format!("Entry creation failed: {}", e),
                }),
            }
        }

        info!(
            imported,
            skipped,
            errors = errors.len(),
            dry_run = options.dry_run,
            "finished CSV import"
        );

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }

    /// What a real import would do with `date`, without writing anything.
    async fn preview(&self, date: NaiveDate, options: &ImportOptions) -> Result<(), AppError> {
        if !options.overwrite && self.service.get_by_date(date).await?.is_some() {
            return Err(AppError::Conflict(date));
        }
        Ok(())
    }
}
