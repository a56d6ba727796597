/*!
 * Isolate Proxy
 * Executive-side representative of one live isolate
 *
 * Translates high-level lifecycle calls into correlated messages. A
 * per-proxy send lock serializes concurrent senders so the order observed
 * at the isolate matches per-sender send order; different proxies send
 * concurrently without interference.
 */

use super::state::IsolateState;
use super::types::{IsolateError, IsolateResult};
use crate::core::types::{AppId, Pid};
use crate::message::command::{AppDescriptor, LifecycleCommand, LifecycleResponse};
use crate::message::correlation::CorrelationTable;
use crate::message::envelope::{Message, Payload};
use crate::message::transport::Transport;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};

/// Executive-side isolate proxy
///
/// Created once per isolate and lives until the isolate is removed from the
/// active set or the executive shuts down.
pub struct IsolateProxy {
    pid: Pid,
    executive_pid: Pid,
    transport: Arc<dyn Transport>,
    correlations: CorrelationTable,
    // State reads never block; writes go through transition() so a read
    // never observes a torn update.
    state: RwLock<IsolateState>,
    state_changed: Notify,
    // Single in-flight send per proxy
    send_lock: Mutex<()>,
    request_timeout: Duration,
}

impl IsolateProxy {
    #[must_use]
    pub fn new(
        pid: Pid,
        executive_pid: Pid,
        transport: Arc<dyn Transport>,
        correlations: CorrelationTable,
        request_timeout: Duration,
    ) -> Self {
        Self {
            pid,
            executive_pid,
            transport,
            correlations,
            state: RwLock::new(IsolateState::Created),
            state_changed: Notify::new(),
            send_lock: Mutex::new(()),
            request_timeout,
        }
    }

    #[inline]
    #[must_use]
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    /// Current lifecycle state; never blocks
    #[must_use]
    pub fn state(&self) -> IsolateState {
        *self.state.read()
    }

    /// Apply a state transition under the proxy lock
    ///
    /// Returns false when the transition is not legal from the current
    /// state, which makes duplicate initialized notifications a no-op.
    pub(crate) fn transition(&self, next: IsolateState) -> bool {
        {
            let mut state = self.state.write();
            if !state.can_transition_to(next) {
                return false;
            }
            debug!("Isolate {}: {:?} -> {:?}", self.pid, *state, next);
            *state = next;
        }
        self.state_changed.notify_waiters();
        true
    }

    /// Mark the isolate initialized; idempotent
    pub fn mark_initialized(&self) -> bool {
        self.transition(IsolateState::Initialized)
    }

    /// Mark the isolate as having failed to initialize (terminal)
    pub fn mark_failed(&self) -> bool {
        self.transition(IsolateState::FailedToInitialize)
    }

    /// Mark the isolate terminated (terminal)
    pub fn mark_terminated(&self) -> bool {
        self.transition(IsolateState::Terminated)
    }

    /// Wait until the isolate reports initialized, a terminal state is
    /// reached, or the bound elapses
    ///
    /// Returns true iff the isolate is active when the wait ends.
    pub async fn await_initialized(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.state_changed.notified();
            let state = self.state();
            if state.is_active() {
                return true;
            }
            if state.is_terminal() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            // Wake on the next transition or when the remaining budget runs
            // out, then re-check.
            let _ = tokio::time::timeout(deadline - now, notified).await;
        }
    }

    /// Enqueue a message for asynchronous delivery to the isolate
    pub async fn send_message(&self, message: Message) -> IsolateResult<()> {
        let _guard = self.send_lock.lock().await;
        self.transport.send(self.pid, message)?;
        Ok(())
    }

    /// Send a request and block until the correlated response arrives or
    /// the bound elapses
    ///
    /// On timeout the correlation is abandoned; a reply that arrives later
    /// is discarded by the dispatcher.
    pub async fn request(&self, message: Message, timeout: Duration) -> IsolateResult<Message> {
        let request_id = message.id;
        let rx = self.correlations.register(request_id);

        {
            let _guard = self.send_lock.lock().await;
            if let Err(e) = self.transport.send(self.pid, message) {
                self.correlations.abandon(request_id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(IsolateError::Transport(
                crate::message::types::MessageError::Closed,
            )),
            Err(_) => {
                self.correlations.abandon(request_id);
                Err(IsolateError::Timeout(timeout))
            }
        }
    }

    /// Start an application in the isolate
    ///
    /// Returns the container-assigned application id; a container refusal
    /// surfaces as `IsolateError::App`.
    pub async fn start_app(&self, app: AppDescriptor, args: Vec<String>) -> IsolateResult<AppId> {
        self.require_active()?;
        let message = self.command(LifecycleCommand::StartApp { app, args });
        let response = self.request(message, self.request_timeout).await?;
        match response.payload {
            Payload::Response(LifecycleResponse::Started { app_id }) => {
                info!("Isolate {}: application {} started", self.pid, app_id);
                self.transition(IsolateState::Running);
                Ok(app_id)
            }
            Payload::Response(LifecycleResponse::Failed { reason }) => {
                warn!("Isolate {}: start refused: {}", self.pid, reason);
                Err(IsolateError::App { reason })
            }
            _ => Err(IsolateError::UnexpectedResponse),
        }
    }

    /// Pause a running application
    pub async fn pause_app(&self, app_id: AppId) -> IsolateResult<()> {
        self.lifecycle_call(LifecycleCommand::PauseApp { app_id }).await
    }

    /// Resume a paused application
    pub async fn resume_app(&self, app_id: AppId) -> IsolateResult<()> {
        self.lifecycle_call(LifecycleCommand::ResumeApp { app_id }).await
    }

    /// Destroy an application; `unconditional` bypasses any veto
    pub async fn destroy_app(&self, app_id: AppId, unconditional: bool) -> IsolateResult<()> {
        self.lifecycle_call(LifecycleCommand::DestroyApp {
            app_id,
            unconditional,
        })
        .await
    }

    async fn lifecycle_call(&self, command: LifecycleCommand) -> IsolateResult<()> {
        self.require_active()?;
        let name = command.name();
        let message = self.command(command);
        let response = self.request(message, self.request_timeout).await?;
        match response.payload {
            Payload::Response(LifecycleResponse::Completed) => Ok(()),
            Payload::Response(LifecycleResponse::Failed { reason }) => {
                debug!("Isolate {}: {} failed: {}", self.pid, name, reason);
                Err(IsolateError::App { reason })
            }
            _ => Err(IsolateError::UnexpectedResponse),
        }
    }

    fn require_active(&self) -> IsolateResult<()> {
        let state = self.state();
        if state.is_active() {
            Ok(())
        } else {
            Err(IsolateError::NotInitialized(self.pid, state))
        }
    }

    fn command(&self, command: LifecycleCommand) -> Message {
        Message::command(self.transport.allocate_id(), self.executive_pid, command)
    }
}
