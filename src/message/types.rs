/*!
 * Message Types
 * Transport-level errors and result alias
 */

use crate::core::types::Pid;
use std::time::Duration;
use thiserror::Error;

/// Message operation result
pub type MessageResult<T> = Result<T, MessageError>;

/// Transport-level errors
///
/// Timeout is deliberately its own variant: callers must be able to tell
/// "no answer yet" apart from any application-level failure reply.
#[derive(Error, Debug, Clone)]
pub enum MessageError {
    #[error("No process registered for pid {0}")]
    ProcessNotFound(Pid),

    #[error("Process {0} is already registered")]
    AlreadyRegistered(Pid),

    #[error("Mailbox closed")]
    Closed,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Mailbox full for pid {0}")]
    LimitExceeded(Pid),

    #[error("Codec error: {0}")]
    Codec(String),
}
