/*!
 * Message Transport
 * Per-process mailboxes with an in-memory implementation
 */

use super::envelope::Message;
use super::types::{MessageError, MessageResult};
use crate::core::types::{MessageId, Pid};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Message transport between the executive and isolate processes
///
/// Implementations must deliver messages from a single sender to a single
/// receiver in send order.
pub trait Transport: Send + Sync {
    /// Open the receive side for a process; at most one mailbox per pid
    fn register(&self, pid: Pid) -> MessageResult<Mailbox>;

    /// Drop the send side for a process, closing its mailbox
    fn unregister(&self, pid: Pid);

    /// Enqueue a message for delivery to `to`
    fn send(&self, to: Pid, message: Message) -> MessageResult<()>;

    /// Allocate a message id; unique for the lifetime of the transport
    fn allocate_id(&self) -> MessageId;
}

/// Receive side of a per-process message queue
pub struct Mailbox {
    pid: Pid,
    rx: flume::Receiver<Message>,
}

impl Mailbox {
    #[inline]
    #[must_use]
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    /// Blocking receive; returns `Closed` once the transport drops the
    /// send side
    pub async fn recv(&self) -> MessageResult<Message> {
        self.rx.recv_async().await.map_err(|_| MessageError::Closed)
    }

    /// Blocking receive with an upper bound
    pub async fn recv_timeout(&self, timeout: Duration) -> MessageResult<Message> {
        match tokio::time::timeout(timeout, self.rx.recv_async()).await {
            Ok(Ok(message)) => Ok(message),
            Ok(Err(_)) => Err(MessageError::Closed),
            Err(_) => Err(MessageError::Timeout(timeout)),
        }
    }

    /// Non-blocking receive
    #[must_use]
    pub fn try_recv(&self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// In-memory transport: bounded flume channels keyed by pid
///
/// Serves in-process isolates and the test harness; a cross-process
/// deployment supplies its own `Transport` implementation.
pub struct InMemoryTransport {
    inboxes: Arc<DashMap<Pid, flume::Sender<Message>, RandomState>>,
    next_pid: Arc<AtomicU32>,
    next_msg_id: Arc<AtomicU64>,
    capacity: usize,
}

impl InMemoryTransport {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        info!("In-memory transport initialized (mailbox capacity: {})", capacity);
        Self {
            inboxes: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_pid: Arc::new(AtomicU32::new(1)),
            next_msg_id: Arc::new(AtomicU64::new(1)),
            capacity,
        }
    }

    /// Allocate a process id, unique for the lifetime of the transport
    #[must_use]
    pub fn allocate_pid(&self) -> Pid {
        self.next_pid.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of registered mailboxes
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.inboxes.len()
    }
}

impl Clone for InMemoryTransport {
    fn clone(&self) -> Self {
        Self {
            inboxes: Arc::clone(&self.inboxes),
            next_pid: Arc::clone(&self.next_pid),
            next_msg_id: Arc::clone(&self.next_msg_id),
            capacity: self.capacity,
        }
    }
}

impl Transport for InMemoryTransport {
    fn register(&self, pid: Pid) -> MessageResult<Mailbox> {
        if self.inboxes.contains_key(&pid) {
            return Err(MessageError::AlreadyRegistered(pid));
        }
        let (tx, rx) = flume::bounded(self.capacity);
        self.inboxes.insert(pid, tx);
        debug!("Registered mailbox for pid {}", pid);
        Ok(Mailbox { pid, rx })
    }

    fn unregister(&self, pid: Pid) {
        if self.inboxes.remove(&pid).is_some() {
            debug!("Unregistered mailbox for pid {}", pid);
        }
    }

    fn send(&self, to: Pid, message: Message) -> MessageResult<()> {
        let tx = self
            .inboxes
            .get(&to)
            .ok_or(MessageError::ProcessNotFound(to))?;
        match tx.try_send(message) {
            Ok(()) => Ok(()),
            Err(flume::TrySendError::Full(_)) => Err(MessageError::LimitExceeded(to)),
            Err(flume::TrySendError::Disconnected(_)) => Err(MessageError::Closed),
        }
    }

    fn allocate_id(&self) -> MessageId {
        self.next_msg_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::command::LifecycleCommand;
    use pretty_assertions::assert_eq;

    fn pause(transport: &InMemoryTransport, sender: Pid, app_id: i32) -> Message {
        Message::command(
            transport.allocate_id(),
            sender,
            LifecycleCommand::PauseApp { app_id },
        )
    }

    #[tokio::test]
    async fn test_send_receive_in_order() {
        let transport = InMemoryTransport::new(16);
        let mailbox = transport.register(1).unwrap();

        transport.send(1, pause(&transport, 2, 1)).unwrap();
        transport.send(1, pause(&transport, 2, 2)).unwrap();

        let first = mailbox.recv().await.unwrap();
        let second = mailbox.recv().await.unwrap();
        assert!(first.id < second.id);
    }

    #[tokio::test]
    async fn test_send_to_unknown_pid() {
        let transport = InMemoryTransport::new(16);
        let result = transport.send(99, pause(&transport, 1, 1));
        assert!(matches!(result, Err(MessageError::ProcessNotFound(99))));
    }

    #[tokio::test]
    async fn test_double_register_rejected() {
        let transport = InMemoryTransport::new(16);
        let _mailbox = transport.register(1).unwrap();
        assert!(matches!(
            transport.register(1),
            Err(MessageError::AlreadyRegistered(1))
        ));
    }

    #[tokio::test]
    async fn test_mailbox_capacity() {
        let transport = InMemoryTransport::new(2);
        let _mailbox = transport.register(1).unwrap();

        transport.send(1, pause(&transport, 2, 1)).unwrap();
        transport.send(1, pause(&transport, 2, 2)).unwrap();
        let result = transport.send(1, pause(&transport, 2, 3));
        assert!(matches!(result, Err(MessageError::LimitExceeded(1))));
    }

    #[tokio::test]
    async fn test_recv_timeout() {
        let transport = InMemoryTransport::new(16);
        let mailbox = transport.register(1).unwrap();

        let result = mailbox.recv_timeout(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(MessageError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_unregister_closes_mailbox() {
        let transport = InMemoryTransport::new(16);
        let mailbox = transport.register(1).unwrap();
        transport.unregister(1);

        let result = mailbox.recv().await;
        assert!(matches!(result, Err(MessageError::Closed)));
    }

    #[test]
    fn test_pid_allocation_monotonic() {
        let transport = InMemoryTransport::new(16);
        let a = transport.allocate_pid();
        let b = transport.allocate_pid();
        assert_eq!(b, a + 1);
    }
}
