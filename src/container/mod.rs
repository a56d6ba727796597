/*!
 * Application Container
 * Per-model collaborator that hosts applications inside an isolate
 */

pub mod task;
pub mod types;

pub use task::TaskContainer;
pub use types::{ContainerError, ContainerResult};

use crate::core::types::AppId;
use crate::message::command::{AppDescriptor, AppModel};
use std::sync::Arc;

/// Container abstraction executed by the isolate-process runtime
///
/// One container implementation per application model. Start is
/// synchronous from the runtime's perspective: it does not return until
/// the container has either assigned an id or refused.
pub trait AppContainer: Send + Sync {
    fn start_app(&self, app: &AppDescriptor, args: &[String]) -> ContainerResult<AppId>;

    fn pause_app(&self, app_id: AppId) -> ContainerResult<()>;

    fn resume_app(&self, app_id: AppId) -> ContainerResult<()>;

    fn destroy_app(&self, app_id: AppId, unconditional: bool) -> ContainerResult<()>;

    /// Number of applications currently hosted
    fn app_count(&self) -> usize;
}

/// Construct the container for an application model
#[must_use]
pub fn container_for_model(model: AppModel) -> Arc<dyn AppContainer> {
    // All three models currently share the task-based container; the
    // factory keeps model-specific containers pluggable.
    Arc::new(TaskContainer::new(model))
}
