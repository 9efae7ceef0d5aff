use std::sync::Arc;

use async_trait::async_trait;
use domain::ProductEvent;

use crate::Result;
use crate::handlers::{EventHandler, unexpected_event};
use crate::services::Notifications;
use crate::unit_of_work::UnitOfWork;

/// Alerts the stock team when a line could not be allocated.
pub struct SendOutOfStockNotification {
    notifications: Arc<dyn Notifications>,
    destination: String,
}

impl SendOutOfStockNotification {
    pub fn new(notifications: Arc<dyn Notifications>, destination: impl Into<String>) -> Self {
        Self {
            notifications,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl EventHandler for SendOutOfStockNotification {
    fn name(&self) -> &'static str {
        "SendOutOfStockNotification"
    }

    async fn handle(&self, event: &ProductEvent, _uow: &mut UnitOfWork) -> Result<()> {
        let ProductEvent::OutOfStock(data) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        self.notifications
            .send(&self.destination, &format!("Out of stock for {}", data.sku))
            .await
    }
}
