//! Product domain events.

use common::{BatchReference, OrderId, Sku};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::OrderLine;

/// Events recorded by the product aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// An order line was allocated to a batch.
    Allocated(Allocated),

    /// An order line was removed from a batch and needs a new home.
    Deallocated(Deallocated),

    /// No batch could satisfy an order line.
    OutOfStock(OutOfStock),
}

/// Registry key for event handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Allocated,
    Deallocated,
    OutOfStock,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Allocated => "Allocated",
            EventKind::Deallocated => "Deallocated",
            EventKind::OutOfStock => "OutOfStock",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProductEvent {
    /// Returns the handler registry key of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            ProductEvent::Allocated(_) => EventKind::Allocated,
            ProductEvent::Deallocated(_) => EventKind::Deallocated,
            ProductEvent::OutOfStock(_) => EventKind::OutOfStock,
        }
    }

    /// Returns the SKU of the product that recorded this event.
    pub fn sku(&self) -> &Sku {
        match self {
            ProductEvent::Allocated(data) => &data.sku,
            ProductEvent::Deallocated(data) => &data.sku,
            ProductEvent::OutOfStock(data) => &data.sku,
        }
    }
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// Data for the Allocated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocated {
    pub order_id: OrderId,
    pub sku: Sku,
    pub quantity: u32,

    /// The batch the line was allocated to.
    pub batch_reference: BatchReference,
}

/// Data for the Deallocated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deallocated {
    pub order_id: OrderId,
    pub sku: Sku,
    pub quantity: u32,
}

/// Data for the OutOfStock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfStock {
    pub sku: Sku,
}

// Convenience constructors for events
impl ProductEvent {
    /// Creates an Allocated event for a line placed in the given batch.
    pub fn allocated(line: &OrderLine, batch_reference: BatchReference) -> Self {
        ProductEvent::Allocated(Allocated {
            order_id: line.order_id.clone(),
            sku: line.sku.clone(),
            quantity: line.quantity,
            batch_reference,
        })
    }

    /// Creates a Deallocated event for a line removed from its batch.
    pub fn deallocated(line: OrderLine) -> Self {
        ProductEvent::Deallocated(Deallocated {
            order_id: line.order_id,
            sku: line.sku,
            quantity: line.quantity,
        })
    }

    /// Creates an OutOfStock event.
    pub fn out_of_stock(sku: Sku) -> Self {
        ProductEvent::OutOfStock(OutOfStock { sku })
    }
}

impl Deallocated {
    /// Returns the order line that was freed.
    pub fn line(&self) -> OrderLine {
        OrderLine::new(self.order_id.clone(), self.sku.clone(), self.quantity)
    }
}

impl From<Allocated> for ProductEvent {
    fn from(data: Allocated) -> Self {
        ProductEvent::Allocated(data)
    }
}

impl From<Deallocated> for ProductEvent {
    fn from(data: Deallocated) -> Self {
        ProductEvent::Deallocated(data)
    }
}

impl From<OutOfStock> for ProductEvent {
    fn from(data: OutOfStock) -> Self {
        ProductEvent::OutOfStock(data)
    }
}
