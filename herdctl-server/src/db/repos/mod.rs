//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - One statement per operation, run through the injected driver
//! - Inserts and updates re-read the affected row by id
//! - Rely on DB constraints for uniqueness (no check-then-insert)

pub mod animals;
pub mod breeding;

pub use animals::AnimalRepo;
pub use breeding::BreedingRepo;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::driver::{Row, StorageError};

/// Repository error type
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The write succeeded but the row could not be read back
    #[error("{table} row {id} was written but could not be read back")]
    Vanished { table: &'static str, id: i64 },

    #[error("unexpected {table} row: {source}")]
    Shape {
        table: &'static str,
        source: serde_json::Error,
    },
}

/// Convert a driver row into a domain record
pub(crate) fn from_row<T: DeserializeOwned>(table: &'static str, row: Row) -> Result<T, RepoError> {
    serde_json::from_value(Value::Object(row)).map_err(|source| RepoError::Shape { table, source })
}
