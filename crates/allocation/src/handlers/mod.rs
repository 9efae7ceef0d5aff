//! Message handlers.
//!
//! Command handlers load products through the unit of work, call the domain
//! model and commit. Event handlers react to facts: they may start new
//! transactions or talk to external services.

mod allocation;
mod batches;
mod notifications;
mod publish;
mod read_model;

pub use allocation::{AllocateHandler, Reallocate};
pub use batches::{AddBatch, ChangeBatchQuantityHandler};
pub use notifications::SendOutOfStockNotification;
pub use publish::PublishEvent;
pub use read_model::UpdateReadModel;

use async_trait::async_trait;
use domain::{ProductCommand, ProductEvent};

use crate::Result;
use crate::error::ServiceError;
use crate::unit_of_work::UnitOfWork;

/// Handles one kind of command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Returns the handler name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Handles the command. Errors propagate to the bus caller.
    async fn handle(&self, command: &ProductCommand, uow: &mut UnitOfWork) -> Result<()>;
}

/// Reacts to one or more kinds of event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns the handler name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Handles the event. Errors are logged by the bus and go no further.
    async fn handle(&self, event: &ProductEvent, uow: &mut UnitOfWork) -> Result<()>;
}

fn unexpected_command(handler: &'static str, command: &ProductCommand) -> ServiceError {
    ServiceError::UnexpectedMessage {
        handler,
        message_type: command.kind().as_str(),
    }
}

fn unexpected_event(handler: &'static str, event: &ProductEvent) -> ServiceError {
    ServiceError::UnexpectedMessage {
        handler,
        message_type: event.kind().as_str(),
    }
}
