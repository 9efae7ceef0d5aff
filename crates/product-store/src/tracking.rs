//! Change tracking around a product store.

use common::{BatchReference, Sku};
use domain::{Aggregate, Product, ProductEvent};

use crate::{
    Result,
    store::{ExpectedVersion, ProductStore, ProductWrite, StoredProduct},
};

struct Tracked {
    product: Product,
    expected: ExpectedVersion,
}

/// Repository that remembers every product it hands out.
///
/// Products returned by [`add`](Self::add), [`get`](Self::get) and
/// [`get_by_batch_reference`](Self::get_by_batch_reference) live in an identity
/// map until [`flush`](Self::flush) writes them back: asking twice for the same
/// SKU yields the same in-memory product, so events recorded through one handle
/// are never lost to a second load.
pub struct TrackingRepository<'a> {
    store: &'a dyn ProductStore,

    /// Products in first-touch order.
    seen: Vec<Tracked>,
}

impl<'a> TrackingRepository<'a> {
    pub fn new(store: &'a dyn ProductStore) -> Self {
        Self {
            store,
            seen: Vec::new(),
        }
    }

    /// Registers a product that is not stored yet.
    ///
    /// Adding a product whose SKU is already tracked replaces the tracked
    /// instance but keeps its expected revision.
    pub fn add(&mut self, product: Product) -> &mut Product {
        let index = match self.position(product.sku()) {
            Some(index) => {
                self.seen[index].product = product;
                index
            }
            None => {
                self.seen.push(Tracked {
                    product,
                    expected: ExpectedVersion::New,
                });
                self.seen.len() - 1
            }
        };
        &mut self.seen[index].product
    }

    /// Returns the product with the given SKU, loading it on first access.
    pub async fn get(&mut self, sku: &Sku) -> Result<Option<&mut Product>> {
        if let Some(index) = self.position(sku) {
            return Ok(Some(&mut self.seen[index].product));
        }
        match self.store.load(sku).await? {
            Some(stored) => Ok(Some(self.track_loaded(stored))),
            None => Ok(None),
        }
    }

    /// Returns the product that owns the batch, loading it on first access.
    pub async fn get_by_batch_reference(
        &mut self,
        reference: &BatchReference,
    ) -> Result<Option<&mut Product>> {
        if let Some(index) = self
            .seen
            .iter()
            .position(|tracked| tracked.product.has_batch(reference))
        {
            return Ok(Some(&mut self.seen[index].product));
        }
        let Some(stored) = self.store.load_by_batch_reference(reference).await? else {
            return Ok(None);
        };
        // The owner may already be tracked without this batch persisted yet.
        if let Some(index) = self.position(stored.product.sku()) {
            return Ok(Some(&mut self.seen[index].product));
        }
        Ok(Some(self.track_loaded(stored)))
    }

    /// Returns the tracked products in first-touch order.
    pub fn seen(&self) -> impl Iterator<Item = &Product> {
        self.seen.iter().map(|tracked| &tracked.product)
    }

    /// Writes every tracked product back to the store in one save.
    ///
    /// On success, returns the pending events of all tracked products in
    /// first-touch order and clears them; the products stay tracked at their
    /// new revisions. On failure nothing is drained.
    pub async fn flush(&mut self) -> Result<Vec<ProductEvent>> {
        let writes = self
            .seen
            .iter()
            .map(|tracked| {
                let mut product = tracked.product.clone();
                product.take_events();
                ProductWrite::new(product, tracked.expected)
            })
            .collect();

        self.store.save(writes).await?;

        let mut events = Vec::new();
        for tracked in &mut self.seen {
            events.extend(tracked.product.take_events());
            tracked.expected = ExpectedVersion::Exact(tracked.expected.next_revision());
        }
        Ok(events)
    }

    /// Forgets every tracked product and its pending events.
    pub fn discard(&mut self) {
        self.seen.clear();
    }

    fn position(&self, sku: &Sku) -> Option<usize> {
        self.seen
            .iter()
            .position(|tracked| tracked.product.sku() == sku)
    }

    fn track_loaded(&mut self, stored: StoredProduct) -> &mut Product {
        let expected = stored.expected();
        self.seen.push(Tracked {
            product: stored.product,
            expected,
        });
        let index = self.seen.len() - 1;
        &mut self.seen[index].product
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryProductStore, ProductStoreExt, StoreError};
    use common::Version;
    use domain::{Batch, OrderLine};

    fn product(sku: &str, reference: &str, quantity: u32) -> Product {
        Product::with_batches(
            sku,
            [Batch::new(reference, sku, quantity, None)],
            Version::initial(),
        )
        .unwrap()
    }

    async fn store_with(sku: &str, reference: &str, quantity: u32) -> InMemoryProductStore {
        let store = InMemoryProductStore::new();
        store
            .save_one(product(sku, reference, quantity), ExpectedVersion::New)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn get_returns_same_instance_on_repeat() {
        let store = store_with("LAMP", "b1", 10).await;
        let mut repo = TrackingRepository::new(&store);

        repo.get(&Sku::new("LAMP"))
            .await
            .unwrap()
            .unwrap()
            .allocate(OrderLine::new("o1", "LAMP", 3))
            .unwrap();
        let again = repo.get(&Sku::new("LAMP")).await.unwrap().unwrap();

        assert_eq!(again.version_number(), Version::new(1));
        assert_eq!(again.events().len(), 1);
        assert_eq!(repo.seen().count(), 1);
    }

    #[tokio::test]
    async fn missing_product_is_none_and_untracked() {
        let store = InMemoryProductStore::new();
        let mut repo = TrackingRepository::new(&store);

        assert!(repo.get(&Sku::new("NOPE")).await.unwrap().is_none());
        assert!(
            repo.get_by_batch_reference(&BatchReference::new("nope"))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(repo.seen().count(), 0);
    }

    #[tokio::test]
    async fn batch_lookup_sees_unsaved_batches() {
        let store = InMemoryProductStore::new();
        let mut repo = TrackingRepository::new(&store);

        let product = repo.add(Product::new("LAMP"));
        product
            .add_batch(Batch::new("b1", "LAMP", 10, None))
            .unwrap();

        let owner = repo
            .get_by_batch_reference(&BatchReference::new("b1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.sku(), &Sku::new("LAMP"));
    }

    #[tokio::test]
    async fn flush_persists_and_drains_events_in_touch_order() {
        let store = InMemoryProductStore::new();
        store
            .save(vec![
                ProductWrite::new(product("LAMP", "b1", 1), ExpectedVersion::New),
                ProductWrite::new(product("DESK", "b2", 10), ExpectedVersion::New),
            ])
            .await
            .unwrap();
        let mut repo = TrackingRepository::new(&store);

        repo.get(&Sku::new("DESK"))
            .await
            .unwrap()
            .unwrap()
            .allocate(OrderLine::new("o1", "DESK", 2))
            .unwrap();
        repo.get(&Sku::new("LAMP"))
            .await
            .unwrap()
            .unwrap()
            .allocate(OrderLine::new("o2", "LAMP", 5))
            .unwrap();

        let events = repo.flush().await.unwrap();
        let types: Vec<_> = events.iter().map(|e| e.kind().as_str()).collect();
        assert_eq!(types, vec!["Allocated", "OutOfStock"]);

        let stored = store.get(&Sku::new("DESK")).await.unwrap().unwrap();
        assert_eq!(stored.version_number(), Version::new(1));
        assert!(stored.events().is_empty());

        // Drained: a second flush has nothing to report.
        assert!(repo.flush().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_flush_keeps_events() {
        let store = store_with("LAMP", "b1", 10).await;
        let mut repo = TrackingRepository::new(&store);
        repo.get(&Sku::new("LAMP"))
            .await
            .unwrap()
            .unwrap()
            .allocate(OrderLine::new("o1", "LAMP", 3))
            .unwrap();

        // Someone else moves the stored product on.
        let mut other = store.get(&Sku::new("LAMP")).await.unwrap().unwrap();
        other.allocate(OrderLine::new("o2", "LAMP", 3)).unwrap();
        store
            .save_one(other, ExpectedVersion::Exact(Version::initial()))
            .await
            .unwrap();

        let err = repo.flush().await.unwrap_err();
        assert!(matches!(err, StoreError::ConcurrencyConflict { .. }));
        let tracked = repo.seen().next().unwrap();
        assert_eq!(tracked.events().len(), 1);
    }

    #[tokio::test]
    async fn flush_detects_changes_that_kept_the_version_number() {
        let store = store_with("LAMP", "b1", 10).await;
        let mut repo = TrackingRepository::new(&store);
        repo.get(&Sku::new("LAMP"))
            .await
            .unwrap()
            .unwrap()
            .allocate(OrderLine::new("o1", "LAMP", 3))
            .unwrap();

        // A quantity change elsewhere does not bump version_number.
        let mut other = store.get(&Sku::new("LAMP")).await.unwrap().unwrap();
        other
            .change_batch_quantity(&BatchReference::new("b1"), 25)
            .unwrap();
        store
            .save_one(other, ExpectedVersion::Exact(Version::initial()))
            .await
            .unwrap();

        assert!(repo.flush().await.unwrap_err().is_conflict());
        let stored = store.get(&Sku::new("LAMP")).await.unwrap().unwrap();
        assert_eq!(stored.batches()[0].purchased_quantity(), 25);
        assert!(stored.batches()[0].allocations().is_empty());
    }

    #[tokio::test]
    async fn repeated_flushes_track_the_revision() {
        let store = store_with("LAMP", "b1", 10).await;
        let mut repo = TrackingRepository::new(&store);
        let lamp = repo.get(&Sku::new("LAMP")).await.unwrap().unwrap();
        lamp.add_batch(Batch::new("b2", "LAMP", 5, None)).unwrap();
        repo.flush().await.unwrap();

        let lamp = repo.get(&Sku::new("LAMP")).await.unwrap().unwrap();
        lamp.add_batch(Batch::new("b3", "LAMP", 5, None)).unwrap();
        repo.flush().await.unwrap();

        let stored = store.load(&Sku::new("LAMP")).await.unwrap().unwrap();
        assert_eq!(stored.revision, Version::new(2));
        assert_eq!(stored.product.batches().len(), 3);
    }

    #[tokio::test]
    async fn discard_forgets_everything() {
        let store = InMemoryProductStore::new();
        let mut repo = TrackingRepository::new(&store);
        repo.add(Product::new("LAMP"));
        repo.discard();

        assert_eq!(repo.seen().count(), 0);
        repo.flush().await.unwrap();
        assert_eq!(store.product_count().await, 0);
    }
}
