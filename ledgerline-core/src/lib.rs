pub mod calculations;
pub mod db;
pub mod error;
pub mod models;

pub use db::repository::{NexusRepository, RepositoryError};
pub use error::{ErrorKind, ItemError};
pub use models::*;
