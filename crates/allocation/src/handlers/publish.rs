use std::sync::Arc;

use async_trait::async_trait;
use domain::ProductEvent;

use crate::Result;
use crate::handlers::EventHandler;
use crate::services::EventPublisher;
use crate::unit_of_work::UnitOfWork;

/// Forwards events unchanged to the external channel.
pub struct PublishEvent {
    publisher: Arc<dyn EventPublisher>,
}

impl PublishEvent {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl EventHandler for PublishEvent {
    fn name(&self) -> &'static str {
        "PublishEvent"
    }

    async fn handle(&self, event: &ProductEvent, _uow: &mut UnitOfWork) -> Result<()> {
        self.publisher.publish(event).await
    }
}
