//! Composition of the default message bus.

use std::sync::Arc;

use domain::{CommandKind, EventKind};
use product_store::ProductStore;
use projections::Projection;

use crate::bus::MessageBus;
use crate::config::Config;
use crate::handlers::{
    AddBatch, AllocateHandler, ChangeBatchQuantityHandler, EventHandler, PublishEvent, Reallocate,
    SendOutOfStockNotification, UpdateReadModel,
};
use crate::registry::HandlerRegistry;
use crate::services::{EventPublisher, Notifications};

/// Builds the registry used by the allocation service.
///
/// - `CreateBatch` → `AddBatch`
/// - `Allocate` → `AllocateHandler`
/// - `ChangeBatchQuantity` → `ChangeBatchQuantityHandler`
/// - `Allocated` → `PublishEvent`, `UpdateReadModel`
/// - `Deallocated` → `UpdateReadModel`, `Reallocate`
/// - `OutOfStock` → `SendOutOfStockNotification`
pub fn default_registry(
    notifications: Arc<dyn Notifications>,
    publisher: Arc<dyn EventPublisher>,
    view: Arc<dyn Projection>,
    config: &Config,
) -> HandlerRegistry {
    let read_model: Arc<dyn EventHandler> = Arc::new(UpdateReadModel::new(view));

    HandlerRegistry::new()
        .on_command(CommandKind::CreateBatch, Arc::new(AddBatch))
        .on_command(CommandKind::Allocate, Arc::new(AllocateHandler))
        .on_command(
            CommandKind::ChangeBatchQuantity,
            Arc::new(ChangeBatchQuantityHandler),
        )
        .on_event(EventKind::Allocated, Arc::new(PublishEvent::new(publisher)))
        .on_event(EventKind::Allocated, Arc::clone(&read_model))
        .on_event(EventKind::Deallocated, read_model)
        .on_event(EventKind::Deallocated, Arc::new(Reallocate))
        .on_event(
            EventKind::OutOfStock,
            Arc::new(SendOutOfStockNotification::new(
                notifications,
                config.stock_alert_destination.clone(),
            )),
        )
}

/// Wires the default handlers to the given capabilities.
pub fn bootstrap(
    store: Arc<dyn ProductStore>,
    notifications: Arc<dyn Notifications>,
    publisher: Arc<dyn EventPublisher>,
    view: Arc<dyn Projection>,
    config: &Config,
) -> MessageBus {
    let registry = default_registry(notifications, publisher, view, config);
    tracing::debug!(
        max_command_attempts = config.max_command_attempts,
        stock_alert_destination = %config.stock_alert_destination,
        "message bus bootstrapped"
    );
    MessageBus::new(store, registry).with_max_command_attempts(config.max_command_attempts)
}
