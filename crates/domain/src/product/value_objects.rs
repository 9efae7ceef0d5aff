//! Value objects for the product domain.

use common::{OrderId, Sku};
use serde::{Deserialize, Serialize};

/// A single line of a customer order: some quantity of one SKU.
///
/// Order lines are compared by value. A line is allocated to at most one batch
/// of its product at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLine {
    /// The order this line belongs to.
    pub order_id: OrderId,

    /// The product being ordered.
    pub sku: Sku,

    /// Number of units requested.
    pub quantity: u32,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(order_id: impl Into<OrderId>, sku: impl Into<Sku>, quantity: u32) -> Self {
        Self {
            order_id: order_id.into(),
            sku: sku.into(),
            quantity,
        }
    }
}
