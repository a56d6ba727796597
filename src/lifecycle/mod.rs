/*!
 * Lifecycle Module
 * Isolate creation, registration, and status handling
 */

pub mod module;
pub mod spawn;
pub mod types;

pub use module::LifecycleModule;
pub use spawn::{InProcSpawner, IsolateSpawner};
pub use types::{LifecycleError, LifecycleResult};
