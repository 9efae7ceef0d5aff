//! Service layer error types.

use common::{BatchReference, Sku};
use domain::ProductError;
use product_store::StoreError;
use projections::ProjectionError;
use thiserror::Error;

/// Errors that can occur while handling messages.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No product exists for the SKU.
    #[error("Invalid sku {0}")]
    InvalidSku(Sku),

    /// No product owns a batch with the reference.
    #[error("Batch not found: {0}")]
    BatchNotFound(BatchReference),

    /// A command must have exactly one registered handler.
    #[error("Invalid command type {command_type}: {handlers} handlers registered, expected 1")]
    InvalidCommandType {
        command_type: &'static str,
        handlers: usize,
    },

    /// A handler was given a message it is not registered for.
    #[error("Handler {handler} cannot handle {message_type}")]
    UnexpectedMessage {
        handler: &'static str,
        message_type: &'static str,
    },

    /// Domain error.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Product store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Read model error.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Notification service error.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Event publisher error.
    #[error("Publish error: {0}")]
    Publish(String),
}

impl ServiceError {
    /// Returns true if the failure was a lost optimistic-concurrency race.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, ServiceError::Store(err) if err.is_conflict())
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::Version;
    use product_store::ExpectedVersion;

    #[test]
    fn invalid_sku_names_the_sku() {
        let err = ServiceError::InvalidSku(Sku::new("NONEXISTENTSKU"));
        assert_eq!(err.to_string(), "Invalid sku NONEXISTENTSKU");
    }

    #[test]
    fn only_store_conflicts_are_concurrency_conflicts() {
        let conflict = ServiceError::from(StoreError::ConcurrencyConflict {
            sku: Sku::new("LAMP"),
            expected: ExpectedVersion::Exact(Version::new(1)),
            actual: Some(Version::new(2)),
        });
        assert!(conflict.is_concurrency_conflict());

        let invalid = ServiceError::from(StoreError::InvalidWrite("dup".to_string()));
        assert!(!invalid.is_concurrency_conflict());
        assert!(!ServiceError::InvalidSku(Sku::new("LAMP")).is_concurrency_conflict());
    }
}
