//! Product aggregate and related types.

mod aggregate;
mod batch;
mod commands;
mod events;
mod value_objects;

pub use aggregate::Product;
pub use batch::Batch;
pub use commands::*;
pub use events::{Allocated, Deallocated, EventKind, OutOfStock, ProductEvent};
pub use value_objects::OrderLine;

use common::{BatchReference, Sku};
use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// A batch or order line belongs to another product.
    #[error("SKU mismatch: expected {expected}, got {actual}")]
    SkuMismatch { expected: Sku, actual: Sku },

    /// The product has no batch with the given reference.
    #[error("Batch not found: {0}")]
    BatchNotFound(BatchReference),

    /// A batch with the given reference already exists.
    #[error("Duplicate batch reference: {0}")]
    DuplicateBatch(BatchReference),

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },
}
