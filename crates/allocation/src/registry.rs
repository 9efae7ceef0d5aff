//! Routing table from message kinds to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use domain::{CommandKind, EventKind};

use crate::Result;
use crate::error::ServiceError;
use crate::handlers::{CommandHandler, EventHandler};

/// Handlers for each command and event kind, built once at composition time.
///
/// Event handlers run in registration order.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    commands: HashMap<CommandKind, Vec<Arc<dyn CommandHandler>>>,
    events: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a command kind.
    pub fn on_command(mut self, kind: CommandKind, handler: Arc<dyn CommandHandler>) -> Self {
        self.commands.entry(kind).or_default().push(handler);
        self
    }

    /// Registers a handler for an event kind, after any already registered.
    pub fn on_event(mut self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Self {
        self.events.entry(kind).or_default().push(handler);
        self
    }

    /// Returns the single handler for a command kind.
    ///
    /// Fails with `InvalidCommandType` unless exactly one handler is registered.
    pub fn command_handler(&self, kind: CommandKind) -> Result<&Arc<dyn CommandHandler>> {
        match self.commands.get(&kind).map(Vec::as_slice) {
            Some([handler]) => Ok(handler),
            other => Err(ServiceError::InvalidCommandType {
                command_type: kind.as_str(),
                handlers: other.map_or(0, <[_]>::len),
            }),
        }
    }

    /// Returns the handlers for an event kind in registration order.
    pub fn event_handlers(&self, kind: EventKind) -> &[Arc<dyn EventHandler>] {
        self.events.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}
