//! Product commands.

use chrono::NaiveDate;
use common::{BatchReference, OrderId, Sku};
use serde::{Deserialize, Serialize};

use super::OrderLine;

/// Commands handled by the allocation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductCommand {
    CreateBatch(CreateBatch),
    Allocate(Allocate),
    ChangeBatchQuantity(ChangeBatchQuantity),
}

/// Registry key for command handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateBatch,
    Allocate,
    ChangeBatchQuantity,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::CreateBatch => "CreateBatch",
            CommandKind::Allocate => "Allocate",
            CommandKind::ChangeBatchQuantity => "ChangeBatchQuantity",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProductCommand {
    /// Returns the handler registry key of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            ProductCommand::CreateBatch(_) => CommandKind::CreateBatch,
            ProductCommand::Allocate(_) => CommandKind::Allocate,
            ProductCommand::ChangeBatchQuantity(_) => CommandKind::ChangeBatchQuantity,
        }
    }
}

/// Command to register a new batch of stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBatch {
    /// The reference of the new batch.
    pub reference: BatchReference,

    /// The product the batch holds.
    pub sku: Sku,

    /// Purchased quantity.
    pub quantity: u32,

    /// Arrival date, or None for stock already in the warehouse.
    pub eta: Option<NaiveDate>,
}

impl CreateBatch {
    /// Creates a new CreateBatch command.
    pub fn new(
        reference: impl Into<BatchReference>,
        sku: impl Into<Sku>,
        quantity: u32,
        eta: Option<NaiveDate>,
    ) -> Self {
        Self {
            reference: reference.into(),
            sku: sku.into(),
            quantity,
            eta,
        }
    }
}

/// Command to allocate an order line to the best available batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocate {
    pub order_id: OrderId,
    pub sku: Sku,
    pub quantity: u32,
}

impl Allocate {
    /// Creates a new Allocate command.
    pub fn new(order_id: impl Into<OrderId>, sku: impl Into<Sku>, quantity: u32) -> Self {
        Self {
            order_id: order_id.into(),
            sku: sku.into(),
            quantity,
        }
    }

    /// Returns the order line this command asks to allocate.
    pub fn line(&self) -> OrderLine {
        OrderLine::new(self.order_id.clone(), self.sku.clone(), self.quantity)
    }
}

/// Command to overwrite the purchased quantity of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatchQuantity {
    pub reference: BatchReference,
    pub quantity: u32,
}

impl ChangeBatchQuantity {
    /// Creates a new ChangeBatchQuantity command.
    pub fn new(reference: impl Into<BatchReference>, quantity: u32) -> Self {
        Self {
            reference: reference.into(),
            quantity,
        }
    }
}

impl From<CreateBatch> for ProductCommand {
    fn from(cmd: CreateBatch) -> Self {
        ProductCommand::CreateBatch(cmd)
    }
}

impl From<Allocate> for ProductCommand {
    fn from(cmd: Allocate) -> Self {
        ProductCommand::Allocate(cmd)
    }
}

impl From<ChangeBatchQuantity> for ProductCommand {
    fn from(cmd: ChangeBatchQuantity) -> Self {
        ProductCommand::ChangeBatchQuantity(cmd)
    }
}
