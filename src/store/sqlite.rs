// SQLite backend: one table per collection with an ascending index on `timestamp`.
// Timestamps are stored as epoch milliseconds. SQLite has no NaN, so unreliable metrics
// are written as NULL and read back as NaN.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

use super::{MetricStore, SchemaState, StoreError, validate_collection_name};
use crate::models::AggregateRecord;

pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
    index: String,
}

fn finite_or_null(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path`; `collection` becomes the table name.
    #[instrument(fields(store = "sqlite", operation = "connect"))]
    pub async fn connect(path: &str, collection: &str) -> Result<Self, StoreError> {
        validate_collection_name(collection)?;
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(StoreError::connect)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .map_err(StoreError::connect)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        // Single session for the process lifetime.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(StoreError::connect)?;
        Ok(Self {
            pool,
            table: collection.to_string(),
            index: format!("idx_{}_timestamp", collection),
        })
    }

    /// Most recent `limit` records, oldest first.
    #[instrument(skip(self), fields(store = "sqlite", operation = "recent"))]
    pub async fn recent(&self, limit: u32) -> Result<Vec<AggregateRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT timestamp, cpu_total, ram, io_requests, temperature FROM \"{}\" \
             ORDER BY timestamp DESC, id DESC LIMIT $1",
            self.table
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::query)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let ms: i64 = row.try_get("timestamp").map_err(StoreError::query)?;
            let timestamp = DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or_else(|| StoreError::query(format!("timestamp out of range: {}", ms)))?;
            let field = |name: &str| -> Result<f64, StoreError> {
                let v: Option<f64> = row.try_get(name).map_err(StoreError::query)?;
                Ok(v.unwrap_or(f64::NAN))
            };
            out.push(AggregateRecord {
                timestamp,
                cpu_total: field("cpu_total")?,
                ram: field("ram")?,
                io_requests: field("io_requests")?,
                temperature: field("temperature")?,
            });
        }
        out.reverse();
        Ok(out)
    }

    /// (type, name) of every schema object attached to the collection's table.
    pub async fn schema_objects(&self) -> Result<Vec<(String, String)>, StoreError> {
        let rows = sqlx::query(
            "SELECT type, name FROM sqlite_master WHERE tbl_name = $1 ORDER BY type, name",
        )
        .bind(&self.table)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::query)?;
        rows.iter()
            .map(|r| -> Result<(String, String), StoreError> {
                Ok((
                    r.try_get("type").map_err(StoreError::query)?,
                    r.try_get("name").map_err(StoreError::query)?,
                ))
            })
            .collect()
    }
}

#[async_trait]
impl MetricStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn collection(&self) -> &str {
        &self.table
    }

    #[instrument(skip(self), fields(store = "sqlite", operation = "ensure_schema", collection = %self.table))]
    async fn ensure_schema(&self) -> Result<SchemaState, StoreError> {
        let existing: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = $1")
                .bind(&self.table)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::schema)?;
        if existing.is_some() {
            return Ok(SchemaState::AlreadyPresent);
        }

        let mut tx = self.pool.begin().await.map_err(StoreError::schema)?;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                id INTEGER PRIMARY KEY,
                timestamp INTEGER NOT NULL,
                cpu_total REAL,
                ram REAL,
                io_requests REAL,
                temperature REAL
            )
            "#,
            self.table
        ))
        .execute(&mut *tx)
        .await
        .map_err(StoreError::schema)?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS \"{}\" ON \"{}\"(timestamp ASC)",
            self.index, self.table
        ))
        .execute(&mut *tx)
        .await
        .map_err(StoreError::schema)?;
        tx.commit().await.map_err(StoreError::schema)?;
        Ok(SchemaState::Created)
    }

    #[instrument(skip(self, record), fields(store = "sqlite", operation = "insert"))]
    async fn insert(&self, record: &AggregateRecord) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO \"{}\" (timestamp, cpu_total, ram, io_requests, temperature) \
             VALUES ($1, $2, $3, $4, $5)",
            self.table
        ))
        .bind(record.timestamp.timestamp_millis())
        .bind(finite_or_null(record.cpu_total))
        .bind(finite_or_null(record.ram))
        .bind(finite_or_null(record.io_requests))
        .bind(finite_or_null(record.temperature))
        .execute(&self.pool)
        .await
        .map_err(StoreError::write)?;
        Ok(())
    }
}
