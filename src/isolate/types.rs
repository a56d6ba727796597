/*!
 * Isolate Types
 * Errors surfaced by executive-side isolate operations
 */

use super::state::IsolateState;
use crate::core::types::Pid;
use crate::message::types::MessageError;
use std::time::Duration;
use thiserror::Error;

/// Isolate operation result
pub type IsolateResult<T> = Result<T, IsolateError>;

/// Errors surfaced by isolate proxy operations
///
/// `Timeout` is a transport-level condition; an application-level refusal
/// arrives as `App` and the two are never conflated.
#[derive(Error, Debug, Clone)]
pub enum IsolateError {
    #[error(transparent)]
    Transport(#[from] MessageError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Application failure: {reason}")]
    App { reason: String },

    #[error("Unexpected response payload")]
    UnexpectedResponse,

    #[error("Isolate {0} is not initialized (state: {1:?})")]
    NotInitialized(Pid, IsolateState),
}
