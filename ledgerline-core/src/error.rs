use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification shared by every calculation error in the crate.
///
/// Each module keeps its own precise error enum; `kind()` on those enums maps
/// into this taxonomy so callers can branch without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-supplied value fails validation (negative income, bad period).
    InvalidInput,
    /// Entity tag outside the supported closed set.
    UnsupportedEntityType,
    /// Jurisdiction code with no entry in the rate table.
    UnsupportedJurisdiction,
    /// Reference data is malformed or missing (bad bracket table, no schedule).
    Configuration,
    /// Persistence backend failure.
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UnsupportedEntityType => "unsupported_entity_type",
            ErrorKind::UnsupportedJurisdiction => "unsupported_jurisdiction",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Store => "store",
        }
    }
}

/// Flattened error carried inside batch results.
///
/// Batch operations never abort on a single bad item; the failing item is
/// reported here while the rest of the batch completes.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ItemError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ItemError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ItemError {
            kind,
            message: message.into(),
        }
    }
}
