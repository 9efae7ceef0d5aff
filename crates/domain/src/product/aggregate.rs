//! Product aggregate implementation.

use common::{BatchReference, Sku, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{Batch, OrderLine, ProductError, ProductEvent};

/// Product aggregate root.
///
/// Owns every batch of one SKU and decides which batch an order line goes to.
/// Mutations record [`ProductEvent`]s that stay pending until drained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    sku: Sku,

    /// Batches in registration order.
    batches: Vec<Batch>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version_number: Version,

    #[serde(skip)]
    events: Vec<ProductEvent>,
}

impl Aggregate for Product {
    type Event = ProductEvent;

    fn aggregate_type() -> &'static str {
        "Product"
    }

    fn version(&self) -> Version {
        self.version_number
    }

    fn pending_events(&self) -> &[ProductEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Product {
    /// Creates a product with no batches at the initial version.
    pub fn new(sku: impl Into<Sku>) -> Self {
        Self {
            sku: sku.into(),
            batches: Vec::new(),
            version_number: Version::initial(),
            events: Vec::new(),
        }
    }

    /// Creates a product from existing batches, e.g. when rebuilding it from storage.
    ///
    /// Every batch must belong to the product's SKU and have a unique reference.
    pub fn with_batches(
        sku: impl Into<Sku>,
        batches: impl IntoIterator<Item = Batch>,
        version_number: Version,
    ) -> Result<Self, ProductError> {
        let mut product = Self::new(sku);
        product.version_number = version_number;
        for batch in batches {
            product.add_batch(batch)?;
        }
        Ok(product)
    }
}

// Query methods
impl Product {
    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    /// Returns the batches in registration order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Returns the batch with the given reference.
    pub fn batch(&self, reference: &BatchReference) -> Option<&Batch> {
        self.batches
            .iter()
            .find(|batch| batch.reference() == reference)
    }

    /// Returns true if this product owns a batch with the given reference.
    pub fn has_batch(&self, reference: &BatchReference) -> bool {
        self.batch(reference).is_some()
    }

    pub fn version_number(&self) -> Version {
        self.version_number
    }

    /// Returns the events recorded since the last drain.
    pub fn events(&self) -> &[ProductEvent] {
        &self.events
    }
}

// Command methods
impl Product {
    /// Registers a new batch of this product.
    pub fn add_batch(&mut self, batch: Batch) -> Result<(), ProductError> {
        if batch.sku() != &self.sku {
            return Err(ProductError::SkuMismatch {
                expected: self.sku.clone(),
                actual: batch.sku().clone(),
            });
        }
        if self.has_batch(batch.reference()) {
            return Err(ProductError::DuplicateBatch(batch.reference().clone()));
        }
        self.batches.push(batch);
        Ok(())
    }

    /// Allocates the line to the preferred batch that can hold it.
    ///
    /// Warehouse stock (no eta) is preferred over shipments, and earlier
    /// shipments over later ones; batches with equal eta keep registration
    /// order. Returns the reference of the batch that received the line, or
    /// `None` after recording [`ProductEvent::OutOfStock`].
    ///
    /// Every call bumps the version, whatever the outcome. A line whose order is
    /// already allocated within this product is left where it is.
    pub fn allocate(&mut self, line: OrderLine) -> Result<Option<BatchReference>, ProductError> {
        if line.sku != self.sku {
            return Err(ProductError::SkuMismatch {
                expected: self.sku.clone(),
                actual: line.sku,
            });
        }
        if line.quantity == 0 {
            return Err(ProductError::InvalidQuantity {
                quantity: line.quantity,
            });
        }

        self.version_number = self.version_number.next();

        if let Some(batch) = self
            .batches
            .iter()
            .find(|batch| batch.is_allocated_to(&line.order_id))
        {
            return Ok(Some(batch.reference().clone()));
        }

        // Option<NaiveDate> orders None first; min_by_key keeps the first of equal keys.
        let preferred = self
            .batches
            .iter_mut()
            .filter(|batch| batch.can_allocate(&line))
            .min_by_key(|batch| batch.eta());

        match preferred {
            Some(batch) => {
                let reference = batch.reference().clone();
                self.events.push(ProductEvent::allocated(&line, reference.clone()));
                batch.allocate(line);
                Ok(Some(reference))
            }
            None => {
                self.events.push(ProductEvent::out_of_stock(self.sku.clone()));
                Ok(None)
            }
        }
    }

    /// Overwrites the purchased quantity of a batch.
    ///
    /// If the batch can no longer hold its allocations, the most recently
    /// allocated lines are removed one at a time until the available quantity
    /// is non-negative, recording a [`ProductEvent::Deallocated`] for each.
    /// Removed lines are not reallocated here.
    pub fn change_batch_quantity(
        &mut self,
        reference: &BatchReference,
        quantity: u32,
    ) -> Result<(), ProductError> {
        let batch = self
            .batches
            .iter_mut()
            .find(|batch| batch.reference() == reference)
            .ok_or_else(|| ProductError::BatchNotFound(reference.clone()))?;

        batch.set_purchased_quantity(quantity);
        while batch.available_quantity() < 0 {
            let Some(line) = batch.deallocate_latest() else {
                break;
            };
            self.events.push(ProductEvent::deallocated(line));
        }
        Ok(())
    }
}
