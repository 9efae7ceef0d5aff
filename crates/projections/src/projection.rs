//! Core projection trait.

use async_trait::async_trait;
use domain::ProductEvent;

use crate::Result;

/// A projection that processes events and updates a read model.
///
/// Projections are the mechanism by which events are transformed into
/// denormalized read models optimized for queries.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Handles a single event, updating the projection's read model.
    ///
    /// Events the projection does not care about are ignored.
    async fn handle(&self, event: &ProductEvent) -> Result<()>;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}
