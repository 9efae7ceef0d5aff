//! Domain model for batch allocation.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits for entities that record events
//! - The Product aggregate, which owns the batches of one SKU and allocates
//!   order lines to them
//! - Product commands and events, and the Message type that wraps them

pub mod aggregate;
pub mod message;
pub mod product;

pub use aggregate::{Aggregate, DomainEvent};
pub use message::Message;
pub use product::{
    Allocate, Allocated, Batch, ChangeBatchQuantity, CommandKind, CreateBatch, Deallocated,
    EventKind, OrderLine, OutOfStock, Product, ProductCommand, ProductError, ProductEvent,
};
