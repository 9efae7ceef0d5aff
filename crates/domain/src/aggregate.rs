//! Core aggregate and domain event traits.

use common::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// Used for logging, metrics labels and external publication.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregate roots that record domain events while they are mutated.
///
/// An aggregate is the unit of consistency: every change to the objects it owns
/// goes through the root, and the root's version is the optimistic-concurrency
/// token checked when the aggregate is persisted.
///
/// Events raised by a mutation stay pending on the aggregate until the unit of
/// work that loaded it commits and drains them with [`Aggregate::take_events`].
pub trait Aggregate: Send + Sync {
    /// The type of events this aggregate records.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the current version of the aggregate.
    fn version(&self) -> Version;

    /// Returns the events recorded since the last drain, oldest first.
    fn pending_events(&self) -> &[Self::Event];

    /// Removes and returns all pending events, oldest first.
    ///
    /// Calling it twice in a row returns an empty list the second time.
    fn take_events(&mut self) -> Vec<Self::Event>;
}
