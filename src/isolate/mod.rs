/*!
 * Isolate Module
 * Executive-side view of a live isolate
 */

pub mod proxy;
pub mod state;
pub mod types;

pub use proxy::IsolateProxy;
pub use state::IsolateState;
pub use types::{IsolateError, IsolateResult};
