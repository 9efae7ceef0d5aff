//! Allocation of order lines.

use async_trait::async_trait;
use common::BatchReference;
use domain::{OrderLine, ProductCommand, ProductEvent};

use crate::Result;
use crate::error::ServiceError;
use crate::handlers::{CommandHandler, EventHandler, unexpected_command, unexpected_event};
use crate::unit_of_work::UnitOfWork;

async fn allocate_line(uow: &mut UnitOfWork, line: OrderLine) -> Result<Option<BatchReference>> {
    let order_id = line.order_id.clone();
    let sku = line.sku.clone();

    let mut tx = uow.begin();
    let product = tx
        .products()
        .get(&sku)
        .await?
        .ok_or_else(|| ServiceError::InvalidSku(sku.clone()))?;
    let batch_reference = product.allocate(line)?;
    tx.commit().await?;

    match &batch_reference {
        Some(reference) => {
            metrics::counter!("allocations_total").increment(1);
            tracing::info!(%order_id, %sku, batch = %reference, "line allocated");
        }
        None => {
            metrics::counter!("allocations_out_of_stock_total").increment(1);
            tracing::info!(%order_id, %sku, "out of stock");
        }
    }
    Ok(batch_reference)
}

/// Allocates an order line to the preferred batch of its product.
pub struct AllocateHandler;

#[async_trait]
impl CommandHandler for AllocateHandler {
    fn name(&self) -> &'static str {
        "Allocate"
    }

    #[tracing::instrument(skip_all, fields(handler = self.name()))]
    async fn handle(&self, command: &ProductCommand, uow: &mut UnitOfWork) -> Result<()> {
        let ProductCommand::Allocate(cmd) = command else {
            return Err(unexpected_command(self.name(), command));
        };
        allocate_line(uow, cmd.line()).await?;
        Ok(())
    }
}

/// Allocates a line again after it was removed from its batch.
pub struct Reallocate;

#[async_trait]
impl EventHandler for Reallocate {
    fn name(&self) -> &'static str {
        "Reallocate"
    }

    #[tracing::instrument(skip_all, fields(handler = self.name()))]
    async fn handle(&self, event: &ProductEvent, uow: &mut UnitOfWork) -> Result<()> {
        let ProductEvent::Deallocated(data) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        allocate_line(uow, data.line()).await?;
        Ok(())
    }
}
