/*!
 * Isolate Executive Library
 * Isolate lifecycle coordination and inter-process message dispatch
 */

pub mod container;
pub mod core;
pub mod executive;
pub mod isolate;
pub mod lifecycle;
pub mod message;
pub mod monitoring;
pub mod process;

// Re-exports
pub use container::{AppContainer, ContainerError, TaskContainer};
pub use crate::core::{AppId, ConfigError, MessageId, Pid, RuntimeConfig};
pub use executive::{Executive, ExecutiveBuilder};
pub use isolate::{IsolateError, IsolateProxy, IsolateState};
pub use lifecycle::{InProcSpawner, IsolateSpawner, LifecycleError, LifecycleModule};
pub use message::{
    AppDescriptor, AppModel, CorrelationTable, InMemoryTransport, LifecycleCommand,
    LifecycleResponse, Mailbox, Message, MessageDispatcher, MessageError, MessageHandler, Payload,
    Transport, LIFECYCLE_MESSAGE_TYPE,
};
pub use monitoring::init_tracing;
pub use process::{BootError, IsolateProcess, RunState};
