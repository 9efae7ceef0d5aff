use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use common::{BatchReference, Sku};
use domain::Aggregate;
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{ProductStore, ProductWrite, StoredProduct, validate_writes},
};

/// In-memory product store implementation for testing.
///
/// This implementation keeps every product in memory and provides
/// the same interface as the PostgreSQL implementation. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<Sku, StoredProduct>>>,
    commits: Arc<AtomicUsize>,
}

impl InMemoryProductStore {
    /// Creates a new empty in-memory product store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successful saves.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Returns true if at least one save has succeeded.
    pub fn committed(&self) -> bool {
        self.commit_count() > 0
    }

    /// Returns the total number of products stored.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }

    /// Clears all products and the commit count.
    pub async fn clear(&self) {
        self.products.write().await.clear();
        self.commits.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn load(&self, sku: &Sku) -> Result<Option<StoredProduct>> {
        Ok(self.products.read().await.get(sku).cloned())
    }

    async fn load_by_batch_reference(
        &self,
        reference: &BatchReference,
    ) -> Result<Option<StoredProduct>> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .find(|stored| stored.product.has_batch(reference))
            .cloned())
    }

    async fn save(&self, writes: Vec<ProductWrite>) -> Result<()> {
        validate_writes(&writes)?;

        let mut products = self.products.write().await;

        // Check every expectation before applying anything
        for write in &writes {
            let sku = write.product.sku();
            let actual = products.get(sku).map(|stored| stored.revision);
            if !write.expected.matches(actual) {
                metrics::counter!("product_store_conflicts_total").increment(1);
                return Err(StoreError::ConcurrencyConflict {
                    sku: sku.clone(),
                    expected: write.expected,
                    actual,
                });
            }
        }

        for write in writes {
            let revision = write.expected.next_revision();
            let mut product = write.product;
            product.take_events();
            products.insert(product.sku().clone(), StoredProduct::new(product, revision));
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("product_store_commits_total").increment(1);

        Ok(())
    }
}
