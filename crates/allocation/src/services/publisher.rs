//! Event publisher trait and in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use domain::ProductEvent;
use tokio::sync::RwLock;

use crate::error::ServiceError;

/// Trait for emitting events to an external channel.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an event. Delivery is fire-and-forget.
    async fn publish(&self, event: &ProductEvent) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    published: Vec<ProductEvent>,
    fail_on_publish: bool,
}

/// In-memory event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory event publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to fail every publish while set.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Returns every published event in publication order.
    pub async fn published(&self) -> Vec<ProductEvent> {
        self.state.read().await.published.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: &ProductEvent) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;

        if state.fail_on_publish {
            return Err(ServiceError::Publish("Channel unavailable".to_string()));
        }

        state.published.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Sku;

    #[tokio::test]
    async fn test_publish_records_event() {
        let publisher = InMemoryEventPublisher::new();
        let event = ProductEvent::out_of_stock(Sku::new("LAMP"));
        publisher.publish(&event).await.unwrap();

        assert_eq!(publisher.published().await, vec![event]);
    }

    #[tokio::test]
    async fn test_fail_on_publish() {
        let publisher = InMemoryEventPublisher::new();
        publisher.set_fail_on_publish(true).await;

        let result = publisher
            .publish(&ProductEvent::out_of_stock(Sku::new("LAMP")))
            .await;
        assert!(result.is_err());
        assert!(publisher.published().await.is_empty());
    }
}
