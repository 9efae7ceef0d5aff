//! Unit of Work: transactional scope around the product repository.

use std::sync::Arc;

use domain::ProductEvent;
use product_store::{ProductStore, StoreError, TrackingRepository};

/// Transaction boundary and event collector for one message bus call.
///
/// Handlers open a [`Transaction`] with [`begin`](Self::begin), mutate products
/// through it and commit. Events drained by each commit accumulate here until
/// the bus takes them with [`collect_new_events`](Self::collect_new_events).
pub struct UnitOfWork {
    store: Arc<dyn ProductStore>,
    collected: Vec<ProductEvent>,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            collected: Vec::new(),
        }
    }

    /// Opens a transaction scope.
    ///
    /// The repository it exposes lives only as long as the scope. Dropping the
    /// transaction without committing rolls it back.
    pub fn begin(&mut self) -> Transaction<'_> {
        Transaction {
            products: TrackingRepository::new(&*self.store),
            collected: &mut self.collected,
            committed: false,
        }
    }

    /// Removes and returns every event drained by commits since the last call,
    /// in the order the products were first touched within each commit.
    pub fn collect_new_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.collected)
    }
}

/// An open transaction over the product repository.
pub struct Transaction<'a> {
    products: TrackingRepository<'a>,
    collected: &'a mut Vec<ProductEvent>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    /// The repository of this transaction.
    pub fn products(&mut self) -> &mut TrackingRepository<'a> {
        &mut self.products
    }

    /// Saves every product touched in this transaction.
    ///
    /// On success the products' pending events move to the unit of work. On
    /// failure nothing is saved and no events are collected.
    pub async fn commit(&mut self) -> Result<(), StoreError> {
        let events = self.products.flush().await?;
        self.collected.extend(events);
        self.committed = true;
        metrics::counter!("unit_of_work_commits_total").increment(1);
        Ok(())
    }

    /// Discards every change and pending event in this transaction.
    pub fn rollback(&mut self) {
        self.products.discard();
    }

    /// Returns true if [`commit`](Self::commit) has succeeded at least once.
    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!("transaction dropped without commit, rolling back");
        }
        self.rollback();
    }
}
