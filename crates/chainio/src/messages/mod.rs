/// L1 message queue contract bindings
pub mod queue;
pub use queue::{IMessageQueue, MessageQueue};

/// L2 message inbox contract bindings
pub mod inbox;
pub use inbox::{IMessageInbox, MessageInbox};
