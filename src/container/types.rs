/*!
 * Container Types
 * Errors surfaced by application containers
 */

use crate::core::types::AppId;
use thiserror::Error;

/// Container operation result
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Container errors
#[derive(Error, Debug, Clone)]
pub enum ContainerError {
    #[error("Unknown application id: {0}")]
    UnknownApp(AppId),

    #[error("Application start failed: {0}")]
    StartFailed(String),

    #[error("Application {0} refused conditional destroy")]
    DestroyRefused(AppId),
}
