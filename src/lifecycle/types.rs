/*!
 * Lifecycle Types
 * Errors surfaced by isolate creation and lookup
 */

use crate::core::types::Pid;
use std::time::Duration;
use thiserror::Error;

/// Lifecycle operation result
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Lifecycle errors
#[derive(Error, Debug, Clone)]
pub enum LifecycleError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Isolate {pid} did not initialize within {waited:?}")]
    InitTimeout { pid: Pid, waited: Duration },

    #[error("Isolate not found: {0}")]
    IsolateNotFound(Pid),
}
