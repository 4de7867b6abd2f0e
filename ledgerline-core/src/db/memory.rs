use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::models::{NexusRecord, NexusStatus};

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{NexusRepository, RepositoryError};

type RecordMap = HashMap<(String, String), NexusRecord>;

/// Process-local [`NexusRepository`] backed by a mutex-guarded map.
///
/// Suits tests and single-process runs that do not need standings to
/// survive a restart. The mutex makes each operation atomic per store,
/// which is stricter than the per-key atomicity the trait asks for.
#[derive(Default)]
pub struct InMemoryNexusRepository {
    records: Mutex<RecordMap>,
}

impl InMemoryNexusRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, RecordMap>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Database("lock poisoned".to_string()))
    }
}

#[async_trait]
impl NexusRepository for InMemoryNexusRepository {
    async fn get_record(
        &self,
        client_id: &str,
        jurisdiction: &str,
    ) -> Result<Option<NexusRecord>, RepositoryError> {
        let records = self.lock()?;
        let key = (client_id.to_string(), jurisdiction.to_string());
        Ok(records.get(&key).cloned())
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
        let mut records = self.lock()?;
        let now = Utc::now();
        let record = records
            .entry((client_id.to_string(), jurisdiction.to_string()))
            .and_modify(|record| {
                record.cumulative_sales += period_sales;
                record.cumulative_transactions += period_transactions;
                record.updated_at = now;
            })
            .or_insert_with(|| NexusRecord {
                client_id: client_id.to_string(),
                jurisdiction: jurisdiction.to_string(),
                threshold_sales,
                threshold_transactions,
                cumulative_sales: period_sales,
                cumulative_transactions: period_transactions,
                status: NexusStatus::Monitoring,
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn set_status(
        &self,
        client_id: &str,
        jurisdiction: &str,
        status: NexusStatus,
    ) -> Result<(), RepositoryError> {
        let mut records = self.lock()?;
        let key = (client_id.to_string(), jurisdiction.to_string());
        let record = records.get_mut(&key).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn list_records(
        &self,
        client_id: &str,
    ) -> Result<Vec<NexusRecord>, RepositoryError> {
        let records = self.lock()?;
        let mut matching: Vec<NexusRecord> = records
            .values()
            .filter(|record| record.client_id == client_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.cumulative_sales.cmp(&a.cumulative_sales));
        Ok(matching)
    }
}

/// Factory for the `"memory"` backend. The connection string is ignored.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn NexusRepository>, RepositoryError> {
        Ok(Box::new(InMemoryNexusRepository::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn accumulate_creates_then_increments() {
        let repo = InMemoryNexusRepository::new();

        let first = repo
            .accumulate_sales("acme", "CA", dec!(500000), None, dec!(60000), 12)
            .await
            .unwrap();
        assert_eq!(first.cumulative_sales, dec!(60000));
        assert_eq!(first.cumulative_transactions, 12);
        assert_eq!(first.status, NexusStatus::Monitoring);

        let second = repo
            .accumulate_sales("acme", "CA", dec!(500000), None, dec!(45000), 8)
            .await
            .unwrap();
        assert_eq!(second.cumulative_sales, dec!(105000));
        assert_eq!(second.cumulative_transactions, 20);
        // The store never transitions the status itself.
        assert_eq!(second.status, NexusStatus::Monitoring);
    }

    #[tokio::test]
    async fn thresholds_are_frozen_at_first_insert() {
        let repo = InMemoryNexusRepository::new();

        repo.accumulate_sales("acme", "NY", dec!(500000), Some(100), dec!(1000), 1)
            .await
            .unwrap();
        let record = repo
            .accumulate_sales("acme", "NY", dec!(999), Some(5), dec!(1000), 1)
            .await
            .unwrap();

        assert_eq!(record.threshold_sales, dec!(500000));
        assert_eq!(record.threshold_transactions, Some(100));
    }

    #[tokio::test]
    async fn set_status_persists_and_missing_key_is_not_found() {
        let repo = InMemoryNexusRepository::new();

        assert!(matches!(
            repo.set_status("acme", "TX", NexusStatus::Exceeded).await,
            Err(RepositoryError::NotFound)
        ));

        repo.accumulate_sales("acme", "TX", dec!(500000), None, dec!(100), 1)
            .await
            .unwrap();
        repo.set_status("acme", "TX", NexusStatus::Exceeded)
            .await
            .unwrap();

        let record = repo.get_record("acme", "TX").await.unwrap().unwrap();
        assert_eq!(record.status, NexusStatus::Exceeded);
    }

    #[tokio::test]
    async fn get_record_returns_none_for_unknown_key() {
        let repo = InMemoryNexusRepository::new();

        let result = repo.get_record("acme", "WA").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn list_records_filters_by_client_and_sorts_by_sales() {
        let repo = InMemoryNexusRepository::new();
        repo.accumulate_sales("acme", "CA", dec!(500000), None, dec!(20000), 4)
            .await
            .unwrap();
        repo.accumulate_sales("acme", "NY", dec!(500000), Some(100), dec!(80000), 9)
            .await
            .unwrap();
        repo.accumulate_sales("other", "CA", dec!(500000), None, dec!(99999), 1)
            .await
            .unwrap();

        let records = repo.list_records("acme").await.unwrap();

        let keys: Vec<(&str, Decimal)> = records
            .iter()
            .map(|r| (r.jurisdiction.as_str(), r.cumulative_sales))
            .collect();
        assert_eq!(keys, vec![("NY", dec!(80000)), ("CA", dec!(20000))]);
    }

    #[tokio::test]
    async fn factory_builds_a_working_repository() {
        let factory = MemoryRepositoryFactory;
        assert_eq!(factory.backend_name(), "memory");

        let repo = factory.create(&DbConfig::default()).await.unwrap();
        let record = repo
            .accumulate_sales("acme", "CA", dec!(500000), None, dec!(10), 1)
            .await
            .unwrap();

        assert_eq!(record.cumulative_sales, dec!(10));
    }
}
