use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::models::{NexusRecord, NexusStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Configuration(_) => ErrorKind::Configuration,
            _ => ErrorKind::Store,
        }
    }
}

/// Keyed store of [`NexusRecord`]s, one row per `(client_id, jurisdiction)`.
#[async_trait]
pub trait NexusRepository: Send + Sync {
    async fn get_record(
        &self,
        client_id: &str,
        jurisdiction: &str,
    ) -> Result<Option<NexusRecord>, RepositoryError>;

    /// Add a period's sales to the running totals for one key, creating the
    /// record on first sight.
    ///
    /// The read-modify-write must be atomic per key: two concurrent calls for
    /// the same `(client_id, jurisdiction)` may not lose an increment.
    /// Thresholds are captured when the record is first created and left
    /// untouched afterwards, and the returned record carries the status as
    /// currently stored; status transitions are the caller's job via
    /// [`set_status`](NexusRepository::set_status).
    async fn accumulate_sales(
        &self,
        client_id: &str,
        jurisdiction: &str,
        threshold_sales: Decimal,
        threshold_transactions: Option<i64>,
        period_sales: Decimal,
        period_transactions: i64,
    ) -> Result<NexusRecord, RepositoryError>;

    async fn set_status(
        &self,
        client_id: &str,
        jurisdiction: &str,
        status: NexusStatus,
    ) -> Result<(), RepositoryError>;

    /// Every record for one client, highest cumulative sales first.
    async fn list_records(&self, client_id: &str)
        -> Result<Vec<NexusRecord>, RepositoryError>;
}
