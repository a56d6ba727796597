/*!
 * Process Module
 * Child-process side of the lifecycle runtime
 */

pub mod runtime;
pub mod types;

pub use runtime::IsolateProcess;
pub use types::{BootError, RunState};
