//! Repository layer for the Product aggregate.
//!
//! [`ProductStore`] is the storage capability, implemented in memory and on
//! PostgreSQL. [`TrackingRepository`] wraps any store and remembers the
//! products it hands out so their events can be collected after a save.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod tracking;

pub use error::{Result, StoreError};
pub use memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use store::{
    ExpectedVersion, ProductStore, ProductStoreExt, ProductWrite, StoredProduct, validate_writes,
};
pub use tracking::TrackingRepository;
