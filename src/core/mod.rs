/*!
 * Core Module
 * Shared types, limits, and runtime configuration
 */

pub mod config;
pub mod limits;
pub mod types;

pub use config::{ConfigError, RuntimeConfig};
pub use types::{AppId, MessageId, Pid, APP_ID_NONE};
