//! Batch entity: a trackable quantity of one SKU.

use chrono::NaiveDate;
use common::{BatchReference, OrderId, Sku};
use serde::{Deserialize, Serialize};

use super::OrderLine;

/// A batch of stock for a single SKU.
///
/// A batch without an `eta` is already in the warehouse; a batch with an
/// `eta` is a shipment arriving on that date. Batches are identified by their
/// reference, so two batches with the same reference are the same batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    reference: BatchReference,
    sku: Sku,
    purchased_quantity: u32,
    eta: Option<NaiveDate>,

    /// Allocated lines, oldest allocation first.
    #[serde(default)]
    allocations: Vec<OrderLine>,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new(
        reference: impl Into<BatchReference>,
        sku: impl Into<Sku>,
        purchased_quantity: u32,
        eta: Option<NaiveDate>,
    ) -> Self {
        Self {
            reference: reference.into(),
            sku: sku.into(),
            purchased_quantity,
            eta,
            allocations: Vec::new(),
        }
    }

    pub fn reference(&self) -> &BatchReference {
        &self.reference
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn eta(&self) -> Option<NaiveDate> {
        self.eta
    }

    pub fn purchased_quantity(&self) -> u32 {
        self.purchased_quantity
    }

    /// Returns the allocated lines, oldest allocation first.
    pub fn allocations(&self) -> &[OrderLine] {
        &self.allocations
    }

    /// Total quantity of all allocated lines.
    pub fn allocated_quantity(&self) -> i64 {
        self.allocations
            .iter()
            .map(|line| i64::from(line.quantity))
            .sum()
    }

    /// Purchased quantity minus allocated quantity.
    ///
    /// Negative only between a quantity reduction and the deallocations that
    /// follow it.
    pub fn available_quantity(&self) -> i64 {
        i64::from(self.purchased_quantity) - self.allocated_quantity()
    }

    /// Returns true if the line is for this batch's SKU and fits in the available quantity.
    pub fn can_allocate(&self, line: &OrderLine) -> bool {
        self.sku == line.sku && self.available_quantity() >= i64::from(line.quantity)
    }

    /// Returns true if a line of the given order is allocated to this batch.
    pub fn is_allocated_to(&self, order_id: &OrderId) -> bool {
        self.allocations.iter().any(|line| &line.order_id == order_id)
    }

    /// Allocates the line if it fits and its order is not already allocated here.
    ///
    /// Returns whether the allocation was recorded.
    pub fn allocate(&mut self, line: OrderLine) -> bool {
        if self.is_allocated_to(&line.order_id) || !self.can_allocate(&line) {
            return false;
        }
        self.allocations.push(line);
        true
    }

    /// Removes the allocation of the given order, if any.
    pub fn deallocate(&mut self, order_id: &OrderId) -> Option<OrderLine> {
        let index = self
            .allocations
            .iter()
            .position(|line| &line.order_id == order_id)?;
        Some(self.allocations.remove(index))
    }

    /// Removes the most recently allocated line, if any.
    pub fn deallocate_latest(&mut self) -> Option<OrderLine> {
        self.allocations.pop()
    }

    pub(crate) fn set_purchased_quantity(&mut self, quantity: u32) {
        self.purchased_quantity = quantity;
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Batch {}

impl std::hash::Hash for Batch {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}
