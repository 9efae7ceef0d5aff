use std::collections::HashSet;

use async_trait::async_trait;
use common::{BatchReference, Sku, Version};
use domain::Product;

use crate::{Result, StoreError};

/// The stored revision a write expects to replace.
///
/// Revisions are managed by the store: a product is inserted at revision 0 and
/// every later save bumps it by one, whatever the write changed. They are
/// unrelated to the product's own `version_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// The product must not be stored yet.
    New,

    /// The stored product must be at exactly this revision.
    Exact(Version),
}

impl ExpectedVersion {
    /// Returns true if a stored product at revision `actual` satisfies this expectation.
    pub fn matches(self, actual: Option<Version>) -> bool {
        match self {
            ExpectedVersion::New => actual.is_none(),
            ExpectedVersion::Exact(expected) => actual == Some(expected),
        }
    }

    /// The revision the product is stored at once this write succeeds.
    pub fn next_revision(self) -> Version {
        match self {
            ExpectedVersion::New => Version::initial(),
            ExpectedVersion::Exact(revision) => revision.next(),
        }
    }
}

impl std::fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpectedVersion::New => f.write_str("new product"),
            ExpectedVersion::Exact(revision) => write!(f, "revision {revision}"),
        }
    }
}

/// A product as loaded from a store, with the revision it is stored at.
#[derive(Debug, Clone)]
pub struct StoredProduct {
    pub product: Product,
    pub revision: Version,
}

impl StoredProduct {
    pub fn new(product: Product, revision: Version) -> Self {
        Self { product, revision }
    }

    /// The expectation a write of this product must carry.
    pub fn expected(&self) -> ExpectedVersion {
        ExpectedVersion::Exact(self.revision)
    }
}

/// A product to persist together with the revision it was read at.
#[derive(Debug, Clone)]
pub struct ProductWrite {
    pub product: Product,
    pub expected: ExpectedVersion,
}

impl ProductWrite {
    pub fn new(product: Product, expected: ExpectedVersion) -> Self {
        Self { product, expected }
    }
}

/// Storage backend for Product aggregates.
///
/// Stores hold the persisted state of each product keyed by SKU, together
/// with a write revision. Pending events are never persisted. All
/// implementations must be thread-safe.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Loads the product with the given SKU.
    async fn load(&self, sku: &Sku) -> Result<Option<StoredProduct>>;

    /// Loads the product that owns the batch with the given reference.
    async fn load_by_batch_reference(
        &self,
        reference: &BatchReference,
    ) -> Result<Option<StoredProduct>>;

    /// Persists the writes atomically - either all succeed or none do.
    ///
    /// Fails with `ConcurrencyConflict` if any stored revision differs from
    /// the write's expectation.
    async fn save(&self, writes: Vec<ProductWrite>) -> Result<()>;
}

/// Extension trait providing convenience methods for product stores.
#[async_trait]
pub trait ProductStoreExt: ProductStore {
    /// Loads the product with the given SKU, without its revision.
    async fn get(&self, sku: &Sku) -> Result<Option<Product>> {
        Ok(self.load(sku).await?.map(|stored| stored.product))
    }

    /// Loads the product owning the batch, without its revision.
    async fn get_by_batch_reference(&self, reference: &BatchReference) -> Result<Option<Product>> {
        Ok(self
            .load_by_batch_reference(reference)
            .await?
            .map(|stored| stored.product))
    }

    /// Persists a single product.
    async fn save_one(&self, product: Product, expected: ExpectedVersion) -> Result<()> {
        self.save(vec![ProductWrite::new(product, expected)]).await
    }

    /// Checks if a product is stored under the SKU.
    async fn exists(&self, sku: &Sku) -> Result<bool> {
        Ok(self.load(sku).await?.is_some())
    }
}

// Blanket implementation for all ProductStore implementations
impl<T: ProductStore + ?Sized> ProductStoreExt for T {}

/// Validates writes before saving.
///
/// A save may touch each product at most once. An empty save is valid.
pub fn validate_writes(writes: &[ProductWrite]) -> Result<()> {
    let mut skus = HashSet::with_capacity(writes.len());
    for write in writes {
        if !skus.insert(write.product.sku()) {
            return Err(StoreError::InvalidWrite(format!(
                "Duplicate write for product {}",
                write.product.sku()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_version_matching() {
        assert!(ExpectedVersion::New.matches(None));
        assert!(!ExpectedVersion::New.matches(Some(Version::initial())));
        assert!(ExpectedVersion::Exact(Version::new(2)).matches(Some(Version::new(2))));
        assert!(!ExpectedVersion::Exact(Version::new(2)).matches(Some(Version::new(3))));
        assert!(!ExpectedVersion::Exact(Version::new(2)).matches(None));
    }

    #[test]
    fn revisions_advance_by_one_per_write() {
        assert_eq!(ExpectedVersion::New.next_revision(), Version::initial());
        assert_eq!(
            ExpectedVersion::Exact(Version::new(4)).next_revision(),
            Version::new(5)
        );

        let stored = StoredProduct::new(Product::new("LAMP"), Version::new(2));
        assert_eq!(stored.expected(), ExpectedVersion::Exact(Version::new(2)));
    }

    #[test]
    fn validate_rejects_duplicate_products() {
        let writes = vec![
            ProductWrite::new(Product::new("LAMP"), ExpectedVersion::New),
            ProductWrite::new(Product::new("LAMP"), ExpectedVersion::New),
        ];
        let err = validate_writes(&writes).unwrap_err();
        assert!(matches!(err, StoreError::InvalidWrite(_)));
    }

    #[test]
    fn validate_accepts_empty_and_distinct_writes() {
        assert!(validate_writes(&[]).is_ok());
        let writes = vec![
            ProductWrite::new(Product::new("LAMP"), ExpectedVersion::New),
            ProductWrite::new(Product::new("DESK"), ExpectedVersion::New),
        ];
        assert!(validate_writes(&writes).is_ok());
    }

    #[test]
    fn conflict_message_names_revisions() {
        let err = StoreError::ConcurrencyConflict {
            sku: Sku::new("LAMP"),
            expected: ExpectedVersion::Exact(Version::new(1)),
            actual: Some(Version::new(2)),
        };
        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "Concurrency conflict for product LAMP: expected revision 1, found revision 2"
        );
    }
}
