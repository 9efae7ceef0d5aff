//! Identifiers shared by every layer of the batch allocation service.

mod types;

pub use types::{BatchReference, OrderId, Sku, Version};
