use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use ledgerline_core::{NexusRecord, NexusRepository, NexusStatus, RepositoryError};

use crate::decimal::{decimal_to_f64, get_decimal};

/// SQLite-backed [`NexusRepository`].
///
/// Upserts go through a single `INSERT .. ON CONFLICT DO UPDATE` statement,
/// so concurrent accumulations for the same key cannot lose an increment.
pub struct SqliteNexusRepository {
    pool: SqlitePool,
}

impl SqliteNexusRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Connection(e.to_string()))?
            .create_if_missing(true);
        // In-memory databases live per connection, so the pool stays at one
        // connection and every query shares the one that ran the migrations.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        debug!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_record(row: &SqliteRow) -> Result<NexusRecord, RepositoryError> {
    let status: String = row
        .try_get("status")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let status = NexusStatus::parse(&status)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid status: {status}")))?;

    Ok(NexusRecord {
        client_id: row
            .try_get("client_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        jurisdiction: row
            .try_get("jurisdiction")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        threshold_sales: get_decimal(row, "threshold_sales")?,
        threshold_transactions: row
            .try_get("threshold_transactions")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        cumulative_sales: get_decimal(row, "cumulative_sales")?,
        cumulative_transactions: row
            .try_get("cumulative_transactions")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        status,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl NexusRepository for SqliteNexusRepository {
    async fn get_record(
        &self,
        client_id: &str,
        jurisdiction: &str,
    ) -> Result<Option<NexusRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM nexus_records WHERE client_id = ? AND jurisdiction = ?",
        )
        .bind(client_id)
        .bind(jurisdiction)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn accumulate_sales(
        &self,
        client_id: &str,
        jurisdiction: &str,
        threshold_sales: Decimal,
        threshold_transactions: Option<i64>,
        period_sales: Decimal,
        period_transactions: i64,
    ) -> Result<NexusRecord, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO nexus_records (
                client_id, jurisdiction, threshold_sales, threshold_transactions,
                cumulative_sales, cumulative_transactions, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(client_id, jurisdiction) DO UPDATE SET
                cumulative_sales = cumulative_sales + excluded.cumulative_sales,
                cumulative_transactions = cumulative_transactions + excluded.cumulative_transactions,
                updated_at = excluded.updated_at
            RETURNING *",
        )
        .bind(client_id)
        .bind(jurisdiction)
        .bind(decimal_to_f64(threshold_sales))
        .bind(threshold_transactions)
        .bind(decimal_to_f64(period_sales))
        .bind(period_transactions)
        .bind(NexusStatus::Monitoring.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row_to_record(&row)
    }

    async fn set_status(
        &self,
        client_id: &str,
        jurisdiction: &str,
        status: NexusStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE nexus_records SET status = ?, updated_at = ?
             WHERE client_id = ? AND jurisdiction = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(client_id)
        .bind(jurisdiction)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_records(
        &self,
        client_id: &str,
    ) -> Result<Vec<NexusRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM nexus_records WHERE client_id = ? ORDER BY cumulative_sales DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }
}
