/*!
 * Executive
 * Process-wide runtime context owning dispatch and the lifecycle module
 *
 * Explicitly constructed and dependency-injected: tests build isolated
 * executives instead of sharing process-wide statics. Default wiring is
 * the in-memory transport with the in-process spawner; a deployment with
 * real OS processes supplies its own transport/spawner pair.
 */

use crate::core::config::RuntimeConfig;
use crate::core::types::Pid;
use crate::lifecycle::module::LifecycleModule;
use crate::lifecycle::spawn::{InProcSpawner, IsolateSpawner};
use crate::message::correlation::CorrelationTable;
use crate::message::dispatcher::MessageDispatcher;
use crate::message::envelope::LIFECYCLE_MESSAGE_TYPE;
use crate::message::transport::{InMemoryTransport, Transport};
use crate::message::types::MessageResult;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Executive runtime context
pub struct Executive {
    pid: Pid,
    transport: Arc<dyn Transport>,
    dispatcher: MessageDispatcher,
    lifecycle: Arc<LifecycleModule>,
    listener: Mutex<Option<JoinHandle<()>>>,
    config: RuntimeConfig,
}

impl Executive {
    #[must_use]
    pub fn builder() -> ExecutiveBuilder {
        ExecutiveBuilder::default()
    }

    #[inline]
    #[must_use]
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    /// Shared outgoing message path used by isolate proxies
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Arc<LifecycleModule> {
        &self.lifecycle
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Stop the inbound listener and release the executive mailbox
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown();
        let listener = self.listener.lock().take();
        if let Some(handle) = listener {
            let _ = handle.await;
        }
        self.transport.unregister(self.pid);
        info!("Executive {} shut down", self.pid);
    }
}

/// Builder for an executive context
#[derive(Default)]
pub struct ExecutiveBuilder {
    config: Option<RuntimeConfig>,
    wiring: Option<(Arc<dyn Transport>, Pid, Arc<dyn IsolateSpawner>)>,
}

impl ExecutiveBuilder {
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Supply a transport, the executive's pid on it, and a matching spawner
    #[inline]
    #[must_use]
    pub fn with_wiring(
        mut self,
        transport: Arc<dyn Transport>,
        pid: Pid,
        spawner: Arc<dyn IsolateSpawner>,
    ) -> Self {
        self.wiring = Some((transport, pid, spawner));
        self
    }

    /// Construct the executive, register its mailbox, and start the
    /// inbound listener
    pub fn build(self) -> MessageResult<Arc<Executive>> {
        let config = self.config.unwrap_or_default();
        let (transport, pid, spawner) = match self.wiring {
            Some(wiring) => wiring,
            None => {
                let memory = InMemoryTransport::new(config.mailbox_capacity);
                let pid = memory.allocate_pid();
                let spawner: Arc<dyn IsolateSpawner> =
                    Arc::new(InProcSpawner::new(memory.clone(), pid));
                (Arc::new(memory) as Arc<dyn Transport>, pid, spawner)
            }
        };

        let mailbox = transport.register(pid)?;
        let correlations = CorrelationTable::new();
        let lifecycle = Arc::new(LifecycleModule::new(
            pid,
            Arc::clone(&transport),
            correlations.clone(),
            spawner,
            config.clone(),
        ));

        let dispatcher = MessageDispatcher::new(correlations);
        let handler: Arc<dyn crate::message::dispatcher::MessageHandler> = Arc::clone(&lifecycle) as _;
        dispatcher.register_handler(LIFECYCLE_MESSAGE_TYPE, handler);
        let listener = dispatcher.start(mailbox);

        info!("Executive initialized as pid {}", pid);
        Ok(Arc::new(Executive {
            pid,
            transport,
            dispatcher,
            lifecycle,
            listener: Mutex::new(Some(listener)),
            config,
        }))
    }
}
