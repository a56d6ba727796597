/*!
 * Isolate Process Runtime
 * Child-process counterpart executing lifecycle commands
 *
 * Boot order is load-bearing: the mailbox is registered before the
 * initialized notification is sent, so the executive can never observe an
 * initialized isolate whose command queue is not yet operational. The
 * listener then dispatches strictly sequentially - one command at a time
 * per isolate - and sends exactly one response per inbound request.
 */

use super::types::{BootError, RunState};
use crate::container::{container_for_model, AppContainer, ContainerResult};
use crate::core::config::RuntimeConfig;
use crate::core::types::Pid;
use crate::message::command::{AppModel, LifecycleCommand, LifecycleResponse};
use crate::message::envelope::{Message, Payload};
use crate::message::transport::Transport;
use crate::message::types::{MessageError, MessageResult};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

/// Child-process lifecycle runtime
pub struct IsolateProcess {
    pid: Pid,
    executive_pid: Pid,
    transport: Arc<dyn Transport>,
    container: Arc<dyn AppContainer>,
    run_state: RwLock<RunState>,
    shutdown: watch::Sender<bool>,
}

impl IsolateProcess {
    #[must_use]
    pub fn new(
        pid: Pid,
        executive_pid: Pid,
        transport: Arc<dyn Transport>,
        model: AppModel,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            pid,
            executive_pid,
            transport,
            container: container_for_model(model),
            run_state: RwLock::new(RunState::Starting),
            shutdown,
        }
    }

    /// Construct from child-process arguments
    ///
    /// Contract: `args[0]` is the application-model name, optional `args[1]`
    /// is a configuration-override path. An unknown model name is fatal.
    pub fn from_args(
        pid: Pid,
        executive_pid: Pid,
        transport: Arc<dyn Transport>,
        args: &[String],
    ) -> Result<(Self, RuntimeConfig), BootError> {
        let model_name = args.first().ok_or(BootError::MissingModel)?;
        let model =
            AppModel::parse(model_name).ok_or_else(|| BootError::UnknownModel(model_name.clone()))?;
        let config = match args.get(1) {
            Some(path) => RuntimeConfig::load_file(std::path::Path::new(path))?,
            None => RuntimeConfig::from_env(),
        };
        Ok((Self::new(pid, executive_pid, transport, model), config))
    }

    #[inline]
    #[must_use]
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    #[must_use]
    pub fn run_state(&self) -> RunState {
        *self.run_state.read()
    }

    /// Signal the message loop to exit
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Boot the process and serve the message loop until shutdown
    ///
    /// Registers the mailbox, notifies the executive exactly once, then
    /// drains commands. Per-command failures become `Failed` responses and
    /// never escape the loop.
    pub async fn run(&self) -> MessageResult<()> {
        // Receive queue must be operational before the executive can learn
        // we are initialized.
        let mailbox = self.transport.register(self.pid)?;
        let initialized = Message::command(
            self.transport.allocate_id(),
            self.pid,
            LifecycleCommand::IsolateInitialized {
                isolate_id: self.pid,
            },
        );
        self.transport.send(self.executive_pid, initialized)?;

        *self.run_state.write() = RunState::Listening;
        info!("Isolate {} listening", self.pid);

        let mut shutdown_rx = self.shutdown.subscribe();
        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!("Isolate {}: exit flag observed", self.pid);
                        break;
                    }
                }
                received = mailbox.recv() => {
                    match received {
                        Ok(message) => self.serve(&message),
                        Err(MessageError::Closed) => {
                            debug!("Isolate {}: mailbox closed", self.pid);
                            break;
                        }
                        Err(e) => warn!("Isolate {}: receive error: {}", self.pid, e),
                    }
                }
            }
        }

        *self.run_state.write() = RunState::ShuttingDown;
        self.transport.unregister(self.pid);
        info!("Isolate {} shut down", self.pid);
        Ok(())
    }

    /// Dispatch one inbound message and send exactly one response
    fn serve(&self, message: &Message) {
        let response = self.process_message(message);
        let reply = Message::response(self.transport.allocate_id(), self.pid, message, response);
        if let Err(e) = self.transport.send(message.sender, reply) {
            warn!(
                "Isolate {}: failed to reply to pid {}: {}",
                self.pid, message.sender, e
            );
        }
    }

    /// Execute one command against the container
    fn process_message(&self, message: &Message) -> LifecycleResponse {
        match &message.payload {
            Payload::Command(command) => self.execute_command(command),
            // Forward compatibility: message types the process does not yet
            // understand are acknowledged, not rejected.
            _ => {
                debug!(
                    "Isolate {}: acknowledging generic {:?} payload",
                    self.pid, message.message_type
                );
                LifecycleResponse::Completed
            }
        }
    }

    fn execute_command(&self, command: &LifecycleCommand) -> LifecycleResponse {
        debug!("Isolate {}: executing {}", self.pid, command.name());
        match command {
            LifecycleCommand::StartApp { app, args } => {
                match self.container.start_app(app, args) {
                    Ok(app_id) => LifecycleResponse::Started { app_id },
                    Err(e) => LifecycleResponse::Failed {
                        reason: e.to_string(),
                    },
                }
            }
            LifecycleCommand::PauseApp { app_id } => ack(self.container.pause_app(*app_id)),
            LifecycleCommand::ResumeApp { app_id } => ack(self.container.resume_app(*app_id)),
            LifecycleCommand::DestroyApp {
                app_id,
                unconditional,
            } => ack(self.container.destroy_app(*app_id, *unconditional)),
            LifecycleCommand::IsolateInitialized { .. } => {
                warn!(
                    "Isolate {}: initialized notification is not a valid isolate command",
                    self.pid
                );
                LifecycleResponse::Failed {
                    reason: "initialized notification is not an isolate command".to_string(),
                }
            }
        }
    }
}

/// Convert a container result into a lifecycle response (NACK on failure)
fn ack(result: ContainerResult<()>) -> LifecycleResponse {
    match result {
        Ok(()) => LifecycleResponse::Completed,
        Err(e) => LifecycleResponse::Failed {
            reason: e.to_string(),
        },
    }
}
