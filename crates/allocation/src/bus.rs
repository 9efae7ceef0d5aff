//! Message bus: dispatches commands and events and drains the cascade.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use domain::{Message, ProductCommand, ProductEvent};
use product_store::ProductStore;

use crate::Result;
use crate::config::DEFAULT_MAX_COMMAND_ATTEMPTS;
use crate::registry::HandlerRegistry;
use crate::unit_of_work::UnitOfWork;

/// Central dispatcher for commands and events.
///
/// Each call to [`handle`](Self::handle) works through a FIFO queue that starts
/// with the given message. Every message's handlers run to completion before
/// the events they committed are appended to the back of the queue, so a
/// cascade is processed breadth-first until no events remain.
#[derive(Clone)]
pub struct MessageBus {
    store: Arc<dyn ProductStore>,
    registry: Arc<HandlerRegistry>,
    max_attempts: usize,
}

impl MessageBus {
    /// Creates a bus over the store with the given routing table.
    pub fn new(store: Arc<dyn ProductStore>, registry: HandlerRegistry) -> Self {
        Self {
            store,
            registry: Arc::new(registry),
            max_attempts: DEFAULT_MAX_COMMAND_ATTEMPTS,
        }
    }

    /// Sets how many times a handler runs when it keeps losing concurrency races.
    ///
    /// Zero is treated as one.
    pub fn with_max_command_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Returns the store handlers read from and write to.
    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Handles a command or event and everything it triggers.
    ///
    /// The first command handler error is returned. Event handler errors are
    /// logged and do not stop sibling handlers or the rest of the cascade.
    pub async fn handle(&self, message: impl Into<Message>) -> Result<()> {
        self.dispatch(message.into()).await
    }

    #[tracing::instrument(
        skip(self, message),
        fields(message_id = %uuid::Uuid::new_v4(), message_type = message.message_type())
    )]
    async fn dispatch(&self, message: Message) -> Result<()> {
        let started = Instant::now();
        let mut uow = UnitOfWork::new(Arc::clone(&self.store));
        let mut queue = VecDeque::from([message]);

        while let Some(message) = queue.pop_front() {
            metrics::counter!("bus_messages_handled_total").increment(1);
            match message {
                Message::Command(command) => self.handle_command(&command, &mut uow).await?,
                Message::Event(event) => self.handle_event(&event, &mut uow).await,
            }
            queue.extend(uow.collect_new_events().into_iter().map(Message::Event));
        }

        metrics::histogram!("bus_dispatch_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        Ok(())
    }

    async fn handle_command(&self, command: &ProductCommand, uow: &mut UnitOfWork) -> Result<()> {
        let handler = self.registry.command_handler(command.kind())?;
        let mut attempt = 1;
        loop {
            match handler.handle(command, uow).await {
                Ok(()) => {
                    tracing::debug!(handler = handler.name(), attempt, "command handled");
                    return Ok(());
                }
                Err(err) if err.is_concurrency_conflict() && attempt < self.max_attempts => {
                    metrics::counter!("bus_retries_total").increment(1);
                    tracing::warn!(
                        handler = handler.name(),
                        attempt,
                        error = %err,
                        "concurrency conflict, retrying command"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn handle_event(&self, event: &ProductEvent, uow: &mut UnitOfWork) {
        for handler in self.registry.event_handlers(event.kind()) {
            let mut attempt = 1;
            let outcome = loop {
                match handler.handle(event, uow).await {
                    Err(err) if err.is_concurrency_conflict() && attempt < self.max_attempts => {
                        metrics::counter!("bus_retries_total").increment(1);
                        tracing::warn!(
                            handler = handler.name(),
                            attempt,
                            error = %err,
                            "concurrency conflict, retrying event handler"
                        );
                        attempt += 1;
                    }
                    outcome => break outcome,
                }
            };

            if let Err(err) = outcome {
                metrics::counter!("bus_event_handler_failures_total").increment(1);
                tracing::error!(
                    handler = handler.name(),
                    event_type = event.kind().as_str(),
                    error = %err,
                    "event handler failed"
                );
            }
        }
    }
}
