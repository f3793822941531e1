use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::application::{BalanceService, EntryView, ExpenseSummary, Recorded};
use crate::domain::{
    BalanceRecord, SortOrder, format_amount, month_bounds, month_of, parse_balance, parse_month,
};
use crate::io::{Exporter, ImportOptions, Importer, write_summary_csv, write_summary_json};

/// Dayspend - daily balance tracker
#[derive(Parser)]
#[command(name = "dayspend")]
#[command(about = "Record one balance per day and see what you spent")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "DAYSPEND_DB", default_value = "dayspend.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Add the balance for a date (fails if the date already has one)
    Add {
        /// Balance at the end of the day (e.g., "1250.40")
        balance: String,

        /// Date of the balance (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Description of the day
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Set the balance for a date, replacing any existing one
    Set {
        /// Balance at the end of the day
        balance: String,

        /// Date of the balance (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Description of the day
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Change an existing entry
    Update {
        /// Entry ID
        id: String,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New balance
        #[arg(short, long)]
        balance: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
    },

    /// Delete every entry
    Clear {
        /// Confirm deletion of all entries
        #[arg(long)]
        yes: bool,
    },

    /// List entries with their daily expense
    List {
        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only this month (YYYY-MM)
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Newest first
        #[arg(long)]
        desc: bool,

        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show one entry by ID or date
    Show {
        /// Entry ID or date (YYYY-MM-DD)
        target: String,
    },

    /// Show the expense derived for a date
    Expense {
        /// Date (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },

    /// Expense summary for a date range or month
    Summary {
        /// Start date (YYYY-MM-DD, defaults to start of current month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Summarize this month (YYYY-MM)
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Entry count and first/last recorded balance
    Overview,

    /// Export all entries to CSV or JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Import entries from CSV (columns: date, balance, description)
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,

        /// Skip dates that already have an entry
        #[arg(long)]
        skip_duplicates: bool,

        /// Replace the balance of dates that already have an entry
        #[arg(long, conflicts_with = "skip_duplicates")]
        overwrite: bool,
    },
}

impl Cli {
    /// Install the log subscriber. Logs go to stderr; `RUST_LOG` wins over `--verbose`.
    pub fn init_tracing(&self) {
        let default_filter = if self.verbose { "dayspend=debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    pub async fn run(self) -> Result<()> {
        // Only `init` may create the file and schema; every other command needs both
        let service = match self.command {
            Commands::Init => BalanceService::init(&self.database).await?,
            _ => BalanceService::connect(&self.database).await?,
        };

        match self.command {
            Commands::Init => {
                println!("Database initialized: {}", self.database);
            }

            Commands::Add {
                balance,
                date,
                description,
            } => {
                let date = parse_date_or_today(date)?;
                let balance = parse_balance_arg(&balance)?;
                let record = service.create(date, balance, description).await?;
                println!(
                    "Added {} for {} ({})",
                    format_amount(record.balance),
                    record.date,
                    record.id
                );
            }

            Commands::Set {
                balance,
                date,
                description,
            } => {
                let date = parse_date_or_today(date)?;
                let balance = parse_balance_arg(&balance)?;
                let recorded = service.record_balance(date, balance, description).await?;
                let verb = match recorded {
                    Recorded::Created(_) => "Added",
                    Recorded::Updated(_) => "Updated",
                };
                let record = recorded.into_record();
                println!(
                    "{} {} for {} ({})",
                    verb,
                    format_amount(record.balance),
                    record.date,
                    record.id
                );
            }

            Commands::Update {
                id,
                date,
                balance,
                description,
                clear_description,
            } => {
                let id = parse_entry_id(&id)?;
                let existing = service
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Entry not found: {}", id))?;

                let date = match date {
                    Some(d) => parse_date(&d)?,
                    None => existing.date,
                };
                let balance = match balance {
                    Some(b) => parse_balance_arg(&b)?,
                    None => existing.balance,
                };
                let description = if clear_description {
                    None
                } else {
                    description.or(existing.description)
                };

                let record = service.update(id, date, balance, description).await?;
                println!(
                    "Updated {}: {} on {}",
                    record.id,
                    format_amount(record.balance),
                    record.date
                );
            }

            Commands::Delete { id } => {
                let id = parse_entry_id(&id)?;
                service.delete(id).await?;
                println!("Deleted entry {}", id);
            }

            Commands::Clear { yes } => {
                if !yes {
                    anyhow::bail!("Refusing to delete all entries without --yes");
                }
                let removed = service.delete_all().await?;
                println!("Deleted {} entries", removed);
            }

            Commands::List {
                from,
                to,
                month,
                desc,
                format,
            } => {
                run_list_command(&service, from, to, month, desc, &format).await?;
            }

            Commands::Show { target } => {
                run_show_command(&service, &target).await?;
            }

            Commands::Expense { date } => {
                let date = parse_date_or_today(date)?;
                match service.daily_expense(date).await? {
                    Some(expense) => println!("{}: spent {}", date, format_amount(expense)),
                    None => println!(
                        "{}: no expense (needs entries for {} and the day before)",
                        date, date
                    ),
                }
            }

            Commands::Summary {
                from,
                to,
                month,
                format,
            } => {
                let summary = match month {
                    Some(m) => {
                        let (year, month) = parse_month_arg(&m)?;
                        service.summarize_month(year, month).await?
                    }
                    None => {
                        let (start, end) = parse_date_range(from, to)?;
                        service.summarize(start, end).await?
                    }
                };
                print_summary(&summary, &format)?;
            }

            Commands::Overview => {
                let overview = service.overview().await?;
                println!("Entries: {}", overview.total_entries);
                if let Some(first) = overview.earliest {
                    println!("First:   {} {}", first.date, format_amount(first.balance));
                }
                if let Some(last) = overview.latest {
                    println!("Latest:  {} {}", last.date, format_amount(last.balance));
                }
            }

            Commands::Export { output, format } => {
                run_export_command(&service, output, &format).await?;
            }

            Commands::Import {
                input,
                dry_run,
                skip_duplicates,
                overwrite,
            } => {
                let options = ImportOptions {
                    dry_run,
                    skip_duplicates,
                    overwrite,
                };
                run_import_command(&service, input, options).await?;
            }
        }

        Ok(())
    }
}

async fn run_list_command(
    service: &BalanceService,
    from: Option<String>,
    to: Option<String>,
    month: Option<String>,
    desc: bool,
    format: &str,
) -> Result<()> {
    let order = if desc {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };

    let records = match (month, from, to) {
        (None, None, None) => service.list_all_ordered(order).await?,
        (Some(m), _, _) => {
            let (year, month) = parse_month_arg(&m)?;
            in_order(service.list_by_month(year, month).await?, order)
        }
        (None, from, to) => {
            let start = match from {
                Some(d) => parse_date(&d)?,
                None => NaiveDate::MIN,
            };
            let end = match to {
                Some(d) => parse_date(&d)?,
                None => NaiveDate::MAX,
            };
            in_order(service.list_by_range(start, end).await?, order)
        }
    };

    let views = service.annotate(records).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&views)?),
        _ => print_entry_table(&views),
    }
    Ok(())
}

async fn run_show_command(service: &BalanceService, target: &str) -> Result<()> {
    let record = match Uuid::parse_str(target) {
        Ok(id) => service.get_by_id(id).await?,
        Err(_) => service.get_by_date(parse_date(target)?).await?,
    };

    let Some(record) = record else {
        println!("No entry found for {}", target);
        return Ok(());
    };

    let expense = service.daily_expense(record.date).await?;
    print_entry_details(&record, expense);
    Ok(())
}

async fn run_export_command(
    service: &BalanceService,
    output: Option<String>,
    format: &str,
) -> Result<()> {
    let writer: Box<dyn std::io::Write> = match &output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let exporter = Exporter::new(service);
    let count = match format {
        "json" => exporter.export_entries_json(writer).await?.entries.len(),
        "csv" => exporter.export_entries_csv(writer).await?,
        other => anyhow::bail!("Unknown export format '{}'. Use csv or json", other),
    };

    if let Some(path) = output {
        eprintln!("Exported {} entries to {}", count, path);
    }
    Ok(())
}

async fn run_import_command(
    service: &BalanceService,
    input: Option<String>,
    options: ImportOptions,
) -> Result<()> {
    let reader: Box<dyn std::io::Read> = match &input {
        Some(path) => Box::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open input file '{}'", path))?,
        ),
        None => Box::new(std::io::stdin()),
    };

    let dry_run = options.dry_run;
    let result = Importer::new(service)
        .import_entries_csv(reader, options)
        .await?;

    let verb = if dry_run { "Would import" } else { "Imported" };
    println!("{} {} entries, skipped {}", verb, result.imported, result.skipped);

    if !result.errors.is_empty() {
        println!("{} errors:", result.errors.len());
        for err in &result.errors {
            match &err.field {
                Some(field) => println!("  line {} ({}): {}", err.line, field, err.error),
                None => println!("  line {}: {}", err.line, err.error),
            }
        }
    }
    Ok(())
}

/// Month and range queries come back oldest first.
fn in_order(mut records: Vec<BalanceRecord>, order: SortOrder) -> Vec<BalanceRecord> {
    if order == SortOrder::Descending {
        records.reverse();
    }
    records
}

fn print_entry_table(views: &[EntryView]) {
    if views.is_empty() {
        println!("No entries found.");
        return;
    }

    println!(
        "{:<12} {:>12} {:>10}  {:<30} {:<36}",
        "DATE", "BALANCE", "EXPENSE", "DESCRIPTION", "ID"
    );
    println!("{}", "-".repeat(104));
    for view in views {
        let record = &view.record;
        println!(
            "{:<12} {:>12} {:>10}  {:<30} {:<36}",
            record.date.to_string(),
            format_amount(record.balance),
            view.daily_expense
                .map(format_amount)
                .unwrap_or_else(|| "-".to_string()),
            truncate(record.description.as_deref().unwrap_or(""), 30),
            record.id.to_string()
        );
    }
}

fn print_entry_details(record: &BalanceRecord, expense: Option<f64>) {
    println!("Entry {}", record.id);
    println!("  Date:        {}", record.date);
    println!("  Balance:     {}", format_amount(record.balance));
    println!(
        "  Expense:     {}",
        expense.map(format_amount).unwrap_or_else(|| "-".to_string())
    );
    if let Some(desc) = &record.description {
        println!("  Description: {}", desc);
    }
    println!("  Created:     {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated:     {}", record.updated_at.format("%Y-%m-%d %H:%M:%S"));
}

fn print_summary(summary: &ExpenseSummary, format: &str) -> Result<()> {
    match format {
        "json" => write_summary_json(summary, std::io::stdout())?,
        "csv" => {
            write_summary_csv(summary, std::io::stdout())?;
        }
        _ => {
            println!("Expense Summary");
            println!("Period: {} to {}", summary.start_date, summary.end_date);
            println!();
            println!("{:<12} {:>12} {:>10}  {:<30}", "DATE", "BALANCE", "EXPENSE", "DESCRIPTION");
            println!("{}", "-".repeat(66));
            for day in &summary.daily_breakdown {
                println!(
                    "{:<12} {:>12} {:>10}  {:<30}",
                    day.date.to_string(),
                    format_amount(day.balance),
                    day.expense.map(format_amount).unwrap_or_else(|| "-".to_string()),
                    truncate(day.description.as_deref().unwrap_or(""), 30)
                );
            }
            println!("{}", "-".repeat(66));
            println!("Opening balance:   {:>12}", format_amount(summary.opening_balance));
            println!("Closing balance:   {:>12}", format_amount(summary.closing_balance));
            println!("Total expenses:    {:>12}", format_amount(summary.total_expenses));
            println!(
                "Average per day:   {:>12}",
                format_amount(summary.average_daily_expense)
            );
            println!(
                "Days recorded:     {:>12}",
                summary.total_days
            );
            println!(
                "Days with spending:{:>12}",
                summary.days_with_expenses
            );
        }
    }
    Ok(())
}

fn parse_date_range(from: Option<String>, to: Option<String>) -> Result<(NaiveDate, NaiveDate)> {
    let today = Local::now().date_naive();

    // Default to_date is today
    let end = match to {
        Some(date_str) => parse_date(&date_str)?,
        None => today,
    };

    // Default from_date is start of current month
    let start = match from {
        Some(date_str) => parse_date(&date_str)?,
        None => {
            let (year, month) = month_of(today);
            month_bounds(year, month)
                .map(|(first, _)| first)
                .unwrap_or(today)
        }
    };

    Ok((start, end))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}

fn parse_date_or_today(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(d) => parse_date(&d),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_balance_arg(input: &str) -> Result<f64> {
    parse_balance(input).with_context(|| format!("Invalid balance '{}'. Use '50.00' or '50'", input))
}

fn parse_month_arg(input: &str) -> Result<(i32, u32)> {
    parse_month(input).with_context(|| format!("Invalid month '{}'. Use YYYY-MM", input))
}

fn parse_entry_id(input: &str) -> Result<Uuid> {
    Uuid::parse_str(input).with_context(|| format!("Invalid entry ID '{}'", input))
}
