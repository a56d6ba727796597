/*!
 * Lifecycle Module
 * Authoritative registry of isolate proxies and native processes
 *
 * Owns isolate creation and the inbound lifecycle-status handler. The
 * spawned process may report initialized before `new_isolate` registers
 * its proxy; both paths go through a first-wins `entry()` insertion keyed
 * by pid, so whichever arrives first creates the proxy and the other
 * observes the same instance.
 */

use super::spawn::IsolateSpawner;
use super::types::{LifecycleError, LifecycleResult};
use crate::core::config::RuntimeConfig;
use crate::core::types::Pid;
use crate::isolate::proxy::IsolateProxy;
use crate::message::command::{AppModel, LifecycleCommand};
use crate::message::correlation::CorrelationTable;
use crate::message::dispatcher::MessageHandler;
use crate::message::envelope::{Message, Payload};
use crate::message::transport::Transport;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Executive-side lifecycle coordinator
pub struct LifecycleModule {
    executive_pid: Pid,
    transport: Arc<dyn Transport>,
    correlations: CorrelationTable,
    spawner: Arc<dyn IsolateSpawner>,
    isolates: DashMap<Pid, Arc<IsolateProxy>, RandomState>,
    // Raw OS processes not modeled as isolates
    native_processes: Mutex<HashSet<Pid>>,
    config: RuntimeConfig,
}

impl LifecycleModule {
    #[must_use]
    pub fn new(
        executive_pid: Pid,
        transport: Arc<dyn Transport>,
        correlations: CorrelationTable,
        spawner: Arc<dyn IsolateSpawner>,
        config: RuntimeConfig,
    ) -> Self {
        info!("Lifecycle module initialized (executive pid {})", executive_pid);
        Self {
            executive_pid,
            transport,
            correlations,
            spawner,
            isolates: DashMap::with_hasher(RandomState::new()),
            native_processes: Mutex::new(HashSet::new()),
            config,
        }
    }

    /// Look up or create the proxy for a pid; first caller wins
    fn proxy_for(&self, pid: Pid) -> Arc<IsolateProxy> {
        self.isolates
            .entry(pid)
            .or_insert_with(|| {
                Arc::new(IsolateProxy::new(
                    pid,
                    self.executive_pid,
                    Arc::clone(&self.transport),
                    self.correlations.clone(),
                    self.config.request_timeout(),
                ))
            })
            .clone()
    }

    /// Spawn a new isolate and wait for its initialized handshake
    ///
    /// The proxy is registered before this call returns and before the wait
    /// begins. On timeout the proxy moves to the terminal
    /// `FailedToInitialize` state and the error carries the bound that
    /// elapsed; callers never receive a half-initialized proxy as success.
    pub async fn new_isolate(&self, model: AppModel) -> LifecycleResult<Arc<IsolateProxy>> {
        let pid = self.spawner.spawn(model)?;
        let proxy = self.proxy_for(pid);

        let timeout = self.config.init_timeout();
        if proxy.await_initialized(timeout).await {
            info!("Isolate {} initialized ({} model)", pid, model);
            return Ok(proxy);
        }

        if proxy.mark_failed() {
            warn!("Isolate {} failed to initialize within {:?}", pid, timeout);
            return Err(LifecycleError::InitTimeout {
                pid,
                waited: timeout,
            });
        }
        // The handshake landed between the wait expiring and the failure
        // transition; the isolate is live after all.
        if proxy.state().is_active() {
            return Ok(proxy);
        }
        Err(LifecycleError::InitTimeout {
            pid,
            waited: timeout,
        })
    }

    /// Look up a registered isolate
    #[must_use]
    pub fn isolate(&self, pid: Pid) -> Option<Arc<IsolateProxy>> {
        self.isolates.get(&pid).map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot of isolates in an active state
    #[must_use]
    pub fn active_isolates(&self) -> Vec<Arc<IsolateProxy>> {
        self.isolates
            .iter()
            .filter(|entry| entry.value().state().is_active())
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Remove an isolate, marking it terminated and closing its mailbox
    ///
    /// Closing the mailbox ends the isolate's message loop.
    pub fn remove_isolate(&self, pid: Pid) -> LifecycleResult<Arc<IsolateProxy>> {
        let (_, proxy) = self
            .isolates
            .remove(&pid)
            .ok_or(LifecycleError::IsolateNotFound(pid))?;
        proxy.mark_terminated();
        self.transport.unregister(pid);
        info!("Isolate {} removed", pid);
        Ok(proxy)
    }

    /// Track a raw OS process not modeled as an isolate
    pub fn register_process(&self, pid: Pid) {
        self.native_processes.lock().insert(pid);
        debug!("Registered native process {}", pid);
    }

    /// Snapshot of tracked native processes
    #[must_use]
    pub fn processes(&self) -> Vec<Pid> {
        self.native_processes.lock().iter().copied().collect()
    }
}

impl MessageHandler for LifecycleModule {
    /// Sole inbound handler for the lifecycle message type
    fn handle_message(&self, message: &Message) {
        match &message.payload {
            Payload::Command(LifecycleCommand::IsolateInitialized { isolate_id }) => {
                // Fire-and-forget notification; no reply is sent. Look up or
                // create the proxy so a handshake that beats new_isolate's
                // registration still lands on the same instance.
                let proxy = self.proxy_for(*isolate_id);
                if proxy.mark_initialized() {
                    info!("Isolate {} reported initialized", isolate_id);
                } else {
                    debug!(
                        "Ignoring duplicate initialized notification from isolate {} (state: {:?})",
                        isolate_id,
                        proxy.state()
                    );
                }
            }
            other => {
                warn!(
                    "Ignoring unrecognized lifecycle message from pid {}: {:?}",
                    message.sender, other
                );
            }
        }
    }
}
