use async_trait::async_trait;

use ledgerline_core::db::{DbConfig, RepositoryFactory};
use ledgerline_core::{NexusRepository, RepositoryError};

use crate::repository::SqliteNexusRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`ledgerline_core::db::RepositoryRegistry`] to make
/// the `"sqlite"` backend available:
///
/// ```rust,no_run
/// use ledgerline_core::db::RepositoryRegistry;
/// use ledgerline_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"nexus.db"`. The file is created if it
    ///   does not exist.
    /// * `":memory:"` for an ephemeral in-memory database (useful for tests).
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn NexusRepository>, RepositoryError> {
        let repo = SqliteNexusRepository::new(&config.connection_string).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
