//! External capability traits and in-memory implementations.

pub mod notifications;
pub mod publisher;

pub use notifications::{InMemoryNotifications, Notifications};
pub use publisher::{EventPublisher, InMemoryEventPublisher};
