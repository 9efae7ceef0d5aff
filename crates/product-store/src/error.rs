use common::{Sku, Version};
use thiserror::Error;

use crate::ExpectedVersion;

/// Errors that can occur when loading or saving products.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer changed the product since it was loaded.
    #[error(
        "Concurrency conflict for product {sku}: expected {expected}, found {}",
        describe_stored(.actual)
    )]
    ConcurrencyConflict {
        sku: Sku,
        expected: ExpectedVersion,
        actual: Option<Version>,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested writes cannot be applied together.
    #[error("Invalid write: {0}")]
    InvalidWrite(String),
}

impl StoreError {
    /// Returns true if retrying the whole operation from a fresh read may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

fn describe_stored(actual: &Option<Version>) -> String {
    match actual {
        Some(revision) => format!("revision {revision}"),
        None => "no stored product".to_string(),
    }
}

/// Result type for product store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
