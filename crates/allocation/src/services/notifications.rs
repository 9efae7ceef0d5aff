//! Notification service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ServiceError;

/// Trait for sending messages to people, e.g. by email.
#[async_trait]
pub trait Notifications: Send + Sync {
    /// Sends a message to a destination.
    async fn send(&self, destination: &str, message: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationsState {
    sent: HashMap<String, Vec<String>>,
    fail_on_send: bool,
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifications {
    state: Arc<RwLock<InMemoryNotificationsState>>,
}

impl InMemoryNotifications {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail every send while set.
    pub async fn set_fail_on_send(&self, fail: bool) {
        self.state.write().await.fail_on_send = fail;
    }

    /// Returns the messages sent to a destination, oldest first.
    pub async fn sent_to(&self, destination: &str) -> Vec<String> {
        self.state
            .read()
            .await
            .sent
            .get(destination)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of messages sent to all destinations.
    pub async fn sent_count(&self) -> usize {
        self.state.read().await.sent.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl Notifications for InMemoryNotifications {
    async fn send(&self, destination: &str, message: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;

        if state.fail_on_send {
            return Err(ServiceError::Notification(format!(
                "Cannot reach {destination}"
            )));
        }

        state
            .sent
            .entry(destination.to_string())
            .or_default()
            .push(message.to_string());
        Ok(())
    }
}
