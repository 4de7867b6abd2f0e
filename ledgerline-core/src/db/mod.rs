pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use memory::{InMemoryNexusRepository, MemoryRepositoryFactory};
pub use repository::{NexusRepository, RepositoryError};
