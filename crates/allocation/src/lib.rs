//! Allocation service layer.
//!
//! This crate ties the domain model to storage and the outside world:
//! - [`UnitOfWork`] and [`Transaction`] scope changes to products and collect
//!   the events their commits release
//! - [`MessageBus`] routes commands and events through a [`HandlerRegistry`]
//!   and drains the resulting cascade
//! - Handlers for batch creation, allocation, quantity changes, reallocation,
//!   out-of-stock alerts, event publication and the allocations read model
//! - [`bootstrap`] wires them together from a [`Config`]

pub mod bootstrap;
pub mod bus;
pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod services;
pub mod telemetry;
pub mod unit_of_work;

pub use bootstrap::{bootstrap, default_registry};
pub use bus::MessageBus;
pub use config::Config;
pub use error::{Result, ServiceError};
pub use handlers::{CommandHandler, EventHandler};
pub use registry::HandlerRegistry;
pub use services::{EventPublisher, InMemoryEventPublisher, InMemoryNotifications, Notifications};
pub use telemetry::init_tracing;
pub use unit_of_work::{Transaction, UnitOfWork};
