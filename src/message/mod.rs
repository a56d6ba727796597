/*!
 * Message Module
 * Typed message envelopes, transport, correlation, and dispatch
 */

pub mod command;
pub mod correlation;
pub mod dispatcher;
pub mod envelope;
pub mod transport;
pub mod types;

pub use command::{AppDescriptor, AppModel, LifecycleCommand, LifecycleResponse};
pub use correlation::CorrelationTable;
pub use dispatcher::{MessageDispatcher, MessageHandler};
pub use envelope::{Message, Payload, LIFECYCLE_MESSAGE_TYPE};
pub use transport::{InMemoryTransport, Mailbox, Transport};
pub use types::{MessageError, MessageResult};
