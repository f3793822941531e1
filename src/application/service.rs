use chrono::NaiveDate;

use crate::domain::{Amount, BalanceRecord, EntryId, SortOrder, month_bounds};
use crate::storage::{BalanceStore, MemoryStore, SqliteStore};

use super::{
    AppError, EntryManager, EntryView, ExpenseCalculator, ExpenseSummary, Overview, Recorded,
    SummaryAggregator,
};

/// Application service providing every balance and expense operation.
/// This is the primary interface for any client (CLI, API, import/export).
pub struct BalanceService<S = SqliteStore> {
    store: S,
}

impl BalanceService<SqliteStore> {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = SqliteStore::init(&db_url).await?;
        Ok(Self::new(store))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = SqliteStore::connect(&db_url).await?;
        Ok(Self::new(store))
    }
}

impl BalanceService<MemoryStore> {
    /// A service whose entries live only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: BalanceStore> BalanceService<S> {
    /// Create a new service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> EntryManager<'_, S> {
        EntryManager::new(&self.store)
    }

    pub fn calculator(&self) -> ExpenseCalculator<'_, S> {
        ExpenseCalculator::new(&self.store)
    }

    pub fn aggregator(&self) -> SummaryAggregator<'_, S> {
        SummaryAggregator::new(&self.store)
    }

    // ========================
    // Queries
    // ========================

    /// All entries, oldest first.
    pub async fn list_all(&self) -> Result<Vec<BalanceRecord>, AppError> {
        self.list_all_ordered(SortOrder::Ascending).await
    }

    pub async fn list_all_ordered(&self, order: SortOrder) -> Result<Vec<BalanceRecord>, AppError> {
        Ok(self.store.get_all(order).await?)
    }

    pub async fn get_by_id(&self, id: EntryId) -> Result<Option<BalanceRecord>, AppError> {
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn get_by_date(&self, date: NaiveDate) -> Result<Option<BalanceRecord>, AppError> {
        Ok(self.store.get_by_date(date).await?)
    }

    /// Entries with `start <= date <= end`, oldest first.
    pub async fn list_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BalanceRecord>, AppError> {
        Ok(self.store.get_by_range(start, end).await?)
    }

    pub async fn list_by_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<BalanceRecord>, AppError> {
        let (start, end) = month_bounds(year, month)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid month: {}-{:02}", year, month)))?;
        self.list_by_range(start, end).await
    }

    pub async fn count_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<usize, AppError> {
        Ok(self.store.count_by_range(start, end).await?)
    }

    /// Entry count plus the first and last entries on record.
    pub async fn overview(&self) -> Result<Overview, AppError> {
        Ok(Overview {
            total_entries: self.store.count_all().await?,
            earliest: self.store.get_earliest().await?,
            latest: self.store.get_latest().await?,
        })
    }

    // ========================
    // Expenses and summaries
    // ========================

    pub async fn daily_expense(&self, date: NaiveDate) -> Result<Option<Amount>, AppError> {
        self.calculator().daily_expense(date).await
    }

    pub async fn summarize(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ExpenseSummary, AppError> {
        self.aggregator().summarize(start, end).await
    }

    pub async fn summarize_month(&self, year: i32, month: u32) -> Result<ExpenseSummary, AppError> {
        self.aggregator().summarize_month(year, month).await
    }

    /// Attach each entry's derived expense.
    pub async fn annotate(&self, records: Vec<BalanceRecord>) -> Result<Vec<EntryView>, AppError> {
        let calculator = self.calculator();
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let daily_expense = calculator.daily_expense(record.date).await?;
            views.push(EntryView {
                record,
                daily_expense,
            });
        }
        Ok(views)
    }

    // ========================
    // Mutations
    // ========================

    pub async fn create(
        &self,
        date: NaiveDate,
        balance: Amount,
        description: Option<String>,
    ) -> Result<BalanceRecord, AppError> {
        self.entries().create(date, balance, description).await
    }

    pub async fn update(
        &self,
        id: EntryId,
        date: NaiveDate,
        balance: Amount,
        description: Option<String>,
    ) -> Result<BalanceRecord, AppError> {
        self.entries().update(id, date, balance, description).await
    }

    /// Create or overwrite the entry for `date`.
    pub async fn record_balance(
        &self,
        date: NaiveDate,
        balance: Amount,
        description: Option<String>,
    ) -> Result<Recorded, AppError> {
        self.entries().record(date, balance, description).await
    }

    pub async fn delete(&self, id: EntryId) -> Result<(), AppError> {
        self.entries().delete(id).await
    }

    pub async fn delete_all(&self) -> Result<u64, AppError> {
        self.entries().delete_all().await
    }
}
