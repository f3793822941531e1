use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{BalanceRecord, EntryId, SortOrder};

use super::{BalanceStore, MIGRATION_001_INITIAL, StoreError, StoreResult};

const SELECT_COLUMNS: &str =
    "SELECT id, date, balance, description, created_at, updated_at FROM balance_entries";

/// SQLite-backed balance store.
/// Dates are stored as day numbers (`num_days_from_ce`) so SQL ordering and
/// `BETWEEN` follow the calendar for every year chrono can represent.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    async fn fetch_one_where<T>(
        &self,
        clause: &str,
        bind: T,
        what: &'static str,
    ) -> Result<Option<BalanceRecord>>
    where
        T: for<'q> sqlx::Encode<'q, Sqlite> + sqlx::Type<Sqlite> + Send + 'static,
    {
        let query = format!("{} WHERE {}", SELECT_COLUMNS, clause);
        let row = sqlx::query(&query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch entry by {}", what))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn fetch_edge(&self, order: SortOrder) -> Result<Option<BalanceRecord>> {
        let query = format!("{} ORDER BY date {} LIMIT 1", SELECT_COLUMNS, sql_order(order));
        let row = sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch edge entry")?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<BalanceRecord> {
        let id_str: String = row.get("id");
        let day: i64 = row.get("date");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(BalanceRecord {
            id: Uuid::parse_str(&id_str).context("Invalid entry ID")?,
            date: date_from_key(day)?,
            balance: row.get("balance"),
            description: row.get("description"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}

fn sql_order(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    }
}

fn date_key(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

fn date_from_key(day: i64) -> Result<NaiveDate> {
    i32::try_from(day)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .with_context(|| format!("Invalid entry date: day {}", day))
}

impl BalanceStore for SqliteStore {
    async fn get_by_id(&self, id: EntryId) -> StoreResult<Option<BalanceRecord>> {
        Ok(self.fetch_one_where("id = ?", id.to_string(), "id").await?)
    }

    async fn get_by_date(&self, date: NaiveDate) -> StoreResult<Option<BalanceRecord>> {
        Ok(self.fetch_one_where("date = ?", date_key(date), "date").await?)
    }

    async fn exists_by_date(&self, date: NaiveDate) -> StoreResult<bool> {
        let row =
            sqlx::query("SELECT EXISTS(SELECT 1 FROM balance_entries WHERE date = ?) as found")
                .bind(date_key(date))
                .fetch_one(&self.pool)
                .await
                .context("Failed to check entry date")?;
        Ok(row.get::<i64, _>("found") != 0)
    }

    async fn get_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<BalanceRecord>> {
        let query = format!(
            "{} WHERE date BETWEEN ? AND ? ORDER BY date ASC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(date_key(start))
            .bind(date_key(end))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list entries in range")?;

        Ok(rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>>>()?)
    }

    async fn count_by_range(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<usize> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM balance_entries WHERE date BETWEEN ? AND ?",
        )
        .bind(date_key(start))
        .bind(date_key(end))
        .fetch_one(&self.pool)
        .await
        .context("Failed to count entries in range")?;

        Ok(row.get::<i64, _>("count") as usize)
    }

    async fn get_all(&self, order: SortOrder) -> StoreResult<Vec<BalanceRecord>> {
        let query = format!("{} ORDER BY date {}", SELECT_COLUMNS, sql_order(order));
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list entries")?;

        Ok(rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>>>()?)
    }

    async fn count_all(&self) -> StoreResult<usize> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM balance_entries")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count entries")?;

        Ok(row.get::<i64, _>("count") as usize)
    }

    async fn get_latest(&self) -> StoreResult<Option<BalanceRecord>> {
        Ok(self.fetch_edge(SortOrder::Descending).await?)
    }

    async fn get_earliest(&self) -> StoreResult<Option<BalanceRecord>> {
        Ok(self.fetch_edge(SortOrder::Ascending).await?)
    }

    async fn save(&self, record: BalanceRecord) -> StoreResult<BalanceRecord> {
        // The UNIQUE index on date makes concurrent writers for one day collide here
        let result = sqlx::query(
            r#"
            INSERT INTO balance_entries (id, date, balance, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                date = excluded.date,
                balance = excluded.balance,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(date_key(record.date))
        .bind(record.balance)
        .bind(&record.description)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                return Err(StoreError::DateTaken(record.date));
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context("Failed to save balance entry")
                    .into());
            }
        }

        debug!(id = %record.id, date = %record.date, "saved balance entry");

        // Re-read so callers see the persisted created_at on updates
        self.get_by_id(record.id).await?.ok_or_else(|| {
            StoreError::Backend(anyhow::anyhow!("Entry vanished after save: {}", record.id))
        })
    }

    async fn delete_by_id(&self, id: EntryId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM balance_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM balance_entries")
            .execute(&self.pool)
            .await
            .context("Failed to delete all entries")?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn temp_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("store.db");
        let url = format!("sqlite:{}?mode=rwc", db_path.display());
        let store = SqliteStore::init(&url).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let (store, _temp) = temp_store().await;
        store.migrate().await.unwrap();
        assert_eq!(store.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_and_fetch_roundtrip() {
        let (store, _temp) = temp_store().await;
        let record = BalanceRecord::new(date("2024-01-01"), 100.25).with_description("payday");

        let saved = store.save(record.clone()).await.unwrap();
        assert_eq!(saved.id, record.id);
        assert_eq!(saved.date, record.date);
        assert_eq!(saved.balance, 100.25);
        assert_eq!(saved.description.as_deref(), Some("payday"));

        let by_date = store.get_by_date(date("2024-01-01")).await.unwrap().unwrap();
        assert_eq!(by_date.id, record.id);
        assert!(store.exists_by_date(date("2024-01-01")).await.unwrap());
        assert!(!store.exists_by_date(date("2024-01-02")).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_date_rejected_by_unique_index() {
        let (store, _temp) = temp_store().await;
        store
            .save(BalanceRecord::new(date("2024-01-01"), 100.0))
            .await
            .unwrap();

        let err = store
            .save(BalanceRecord::new(date("2024-01-01"), 50.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DateTaken(d) if d == date("2024-01-01")));
        assert_eq!(store.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let (store, _temp) = temp_store().await;
        let original = store
            .save(BalanceRecord::new(date("2024-01-01"), 100.0))
            .await
            .unwrap();

        let mut changed = original.revised(date("2024-01-03"), 80.0, None);
        // Even if a caller tampers with created_at, the store keeps the first one
        changed.created_at = Utc::now() + chrono::Duration::days(1);
        let updated = store.save(changed).await.unwrap();

        assert_eq!(updated.date, date("2024-01-03"));
        assert_eq!(
            updated.created_at.to_rfc3339(),
            original.created_at.to_rfc3339()
        );
        assert_eq!(store.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_range_and_ordering() {
        let (store, _temp) = temp_store().await;
        for (d, b) in [("2024-01-03", 95.0), ("2024-01-01", 100.0), ("2024-01-02", 80.0)] {
            store.save(BalanceRecord::new(date(d), b)).await.unwrap();
        }

        let range = store
            .get_by_range(date("2024-01-02"), date("2024-01-03"))
            .await
            .unwrap();
        let dates: Vec<_> = range.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2024-01-02"), date("2024-01-03")]);

        let inverted = store
            .get_by_range(date("2024-01-03"), date("2024-01-01"))
            .await
            .unwrap();
        assert!(inverted.is_empty());

        let desc = store.get_all(SortOrder::Descending).await.unwrap();
        assert_eq!(desc[0].date, date("2024-01-03"));
        assert_eq!(desc[2].date, date("2024-01-01"));

        assert_eq!(
            store.get_earliest().await.unwrap().unwrap().date,
            date("2024-01-01")
        );
        assert_eq!(
            store.get_latest().await.unwrap().unwrap().date,
            date("2024-01-03")
        );
        assert_eq!(
            store
                .count_by_range(date("2024-01-01"), date("2024-01-31"))
                .await
                .unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_ordering_across_five_digit_years() {
        let (store, _temp) = temp_store().await;
        let last_four_digit = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        let first_five_digit = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        let before_common_era = NaiveDate::from_ymd_opt(-1, 6, 1).unwrap();
        store
            .save(BalanceRecord::new(first_five_digit, 60.0))
            .await
            .unwrap();
        store
            .save(BalanceRecord::new(last_four_digit, 100.0))
            .await
            .unwrap();
        store
            .save(BalanceRecord::new(before_common_era, 5.0))
            .await
            .unwrap();

        let asc: Vec<_> = store
            .get_all(SortOrder::Ascending)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(asc, vec![before_common_era, last_four_digit, first_five_digit]);

        let range = store
            .get_by_range(last_four_digit, first_five_digit)
            .await
            .unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[1].date, first_five_digit);
        assert_eq!(
            store.get_latest().await.unwrap().unwrap().date,
            first_five_digit
        );
        assert_eq!(
            store.get_earliest().await.unwrap().unwrap().date,
            before_common_era
        );
        assert!(store.get_by_date(first_five_digit).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _temp) = temp_store().await;
        let a = store
            .save(BalanceRecord::new(date("2024-01-01"), 1.0))
            .await
            .unwrap();
        store
            .save(BalanceRecord::new(date("2024-01-02"), 2.0))
            .await
            .unwrap();

        assert!(store.delete_by_id(a.id).await.unwrap());
        assert!(!store.delete_by_id(a.id).await.unwrap());
        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(store.get_all(SortOrder::Ascending).await.unwrap().is_empty());
    }
}
