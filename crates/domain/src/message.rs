//! Messages accepted by the message bus.

use crate::product::{
    Allocate, Allocated, ChangeBatchQuantity, CreateBatch, Deallocated, OutOfStock,
    ProductCommand, ProductEvent,
};

/// A command or an event.
///
/// Commands express intent and have exactly one handler; events record facts
/// and have any number of handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Command(ProductCommand),
    Event(ProductEvent),
}

impl Message {
    /// Returns the name of the wrapped command or event type.
    pub fn message_type(&self) -> &'static str {
        match self {
            Message::Command(command) => command.kind().as_str(),
            Message::Event(event) => event.kind().as_str(),
        }
    }

    /// Returns true if this message is a command.
    pub fn is_command(&self) -> bool {
        matches!(self, Message::Command(_))
    }
}

impl From<ProductCommand> for Message {
    fn from(command: ProductCommand) -> Self {
        Message::Command(command)
    }
}

impl From<ProductEvent> for Message {
    fn from(event: ProductEvent) -> Self {
        Message::Event(event)
    }
}

macro_rules! impl_from_variant {
    ($wrapper:ident => $($ty:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Message {
                fn from(value: $ty) -> Self {
                    Message::from($wrapper::from(value))
                }
            }
        )+
    };
}

impl_from_variant!(ProductCommand => CreateBatch, Allocate, ChangeBatchQuantity);
impl_from_variant!(ProductEvent => Allocated, Deallocated, OutOfStock);

#[cfg(test)]
mod tests {
    use super::*;
    use common::Sku;

    #[test]
    fn wraps_commands_and_events() {
        let command = Message::from(Allocate::new("o1", "LAMP", 1));
        assert!(command.is_command());
        assert_eq!(command.message_type(), "Allocate");

        let event = Message::from(OutOfStock {
            sku: Sku::new("LAMP"),
        });
        assert!(!event.is_command());
        assert_eq!(event.message_type(), "OutOfStock");
    }
}
