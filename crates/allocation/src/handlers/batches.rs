//! Batch registration and quantity changes.

use async_trait::async_trait;
use domain::{Batch, Product, ProductCommand, ProductError};

use crate::Result;
use crate::error::ServiceError;
use crate::handlers::{CommandHandler, unexpected_command};
use crate::unit_of_work::UnitOfWork;

/// Registers a new batch, creating its product on first use.
///
/// Fails with `DuplicateBatch` if any product already owns the reference.
pub struct AddBatch;

#[async_trait]
impl CommandHandler for AddBatch {
    fn name(&self) -> &'static str {
        "AddBatch"
    }

    #[tracing::instrument(skip_all, fields(handler = self.name()))]
    async fn handle(&self, command: &ProductCommand, uow: &mut UnitOfWork) -> Result<()> {
        let ProductCommand::CreateBatch(cmd) = command else {
            return Err(unexpected_command(self.name(), command));
        };

        let mut tx = uow.begin();
        let products = tx.products();
        // References are unique across products, not just within one.
        if products.get_by_batch_reference(&cmd.reference).await?.is_some() {
            return Err(ProductError::DuplicateBatch(cmd.reference.clone()).into());
        }
        if products.get(&cmd.sku).await?.is_none() {
            products.add(Product::new(cmd.sku.clone()));
        }
        let product = products
            .get(&cmd.sku)
            .await?
            .ok_or_else(|| ServiceError::InvalidSku(cmd.sku.clone()))?;
        product.add_batch(Batch::new(
            cmd.reference.clone(),
            cmd.sku.clone(),
            cmd.quantity,
            cmd.eta,
        ))?;
        tx.commit().await?;

        tracing::info!(
            reference = %cmd.reference,
            sku = %cmd.sku,
            quantity = cmd.quantity,
            "batch added"
        );
        Ok(())
    }
}

/// Overwrites the purchased quantity of a batch.
///
/// Lines the batch can no longer hold are deallocated; reallocating them is
/// left to the `Deallocated` event handlers.
pub struct ChangeBatchQuantityHandler;

#[async_trait]
impl CommandHandler for ChangeBatchQuantityHandler {
    fn name(&self) -> &'static str {
        "ChangeBatchQuantity"
    }

    #[tracing::instrument(skip_all, fields(handler = self.name()))]
    async fn handle(&self, command: &ProductCommand, uow: &mut UnitOfWork) -> Result<()> {
        let ProductCommand::ChangeBatchQuantity(cmd) = command else {
            return Err(unexpected_command(self.name(), command));
        };

        let mut tx = uow.begin();
        let product = tx
            .products()
            .get_by_batch_reference(&cmd.reference)
            .await?
            .ok_or_else(|| ServiceError::BatchNotFound(cmd.reference.clone()))?;
        product.change_batch_quantity(&cmd.reference, cmd.quantity)?;
        let deallocated = product.events().len();
        tx.commit().await?;

        tracing::info!(
            reference = %cmd.reference,
            quantity = cmd.quantity,
            deallocated,
            "batch quantity changed"
        );
        Ok(())
    }
}
