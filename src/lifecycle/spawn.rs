/*!
 * Isolate Spawning
 * OS-process creation behind a trait, with an in-process implementation
 */

use super::types::LifecycleResult;
use crate::core::types::Pid;
use crate::message::command::AppModel;
use crate::message::transport::{InMemoryTransport, Transport};
use crate::process::runtime::IsolateProcess;
use log::{error, info};
use std::sync::Arc;

/// Creates the OS-level process hosting a new isolate
///
/// A spawn failure is an error distinguishable from any legal pid.
pub trait IsolateSpawner: Send + Sync {
    fn spawn(&self, model: AppModel) -> LifecycleResult<Pid>;
}

/// Spawner that boots isolates as tasks on the in-memory transport
///
/// Each "process" is an `IsolateProcess` running on its own tokio task,
/// wired to the shared transport. Must be called from within a tokio
/// runtime. A cross-process deployment supplies its own spawner and
/// transport pair behind the same traits.
pub struct InProcSpawner {
    transport: InMemoryTransport,
    executive_pid: Pid,
}

impl InProcSpawner {
    #[must_use]
    pub fn new(transport: InMemoryTransport, executive_pid: Pid) -> Self {
        Self {
            transport,
            executive_pid,
        }
    }
}

impl IsolateSpawner for InProcSpawner {
    fn spawn(&self, model: AppModel) -> LifecycleResult<Pid> {
        let pid = self.transport.allocate_pid();
        let transport: Arc<dyn Transport> = Arc::new(self.transport.clone());
        let process = Arc::new(IsolateProcess::new(
            pid,
            self.executive_pid,
            transport,
            model,
        ));

        info!("Spawning {} isolate as pid {}", model, pid);
        tokio::spawn(async move {
            if let Err(e) = process.run().await {
                error!("Isolate {} aborted: {}", pid, e);
            }
        });

        Ok(pid)
    }
}
