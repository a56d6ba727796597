/*!
 * Process Types
 * Run states and boot errors for the isolate-process runtime
 */

use crate::core::config::ConfigError;
use crate::message::types::MessageError;
use thiserror::Error;

/// Run state of an isolate process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Booting: OS bindings installed, mailbox not yet serving
    Starting,
    /// Message loop is draining the inbound command queue
    Listening,
    /// Exit flag observed; the loop is unwinding
    ShuttingDown,
}

/// Fatal boot errors
///
/// These propagate and abort the child process: no message path exists yet
/// to report them otherwise.
#[derive(Error, Debug)]
pub enum BootError {
    #[error("Missing application model argument")]
    MissingModel,

    #[error("Unknown application model: {0}")]
    UnknownModel(String),

    #[error(transparent)]
    Transport(#[from] MessageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
