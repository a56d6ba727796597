/*!
 * Message Dispatcher
 * Per-type handler registration and the executive's inbound listener
 *
 * One listener task drains the executive mailbox. Responses are routed to
 * the correlation table; everything else fans out to the handlers
 * registered for its message type. A misbehaving handler never kills the
 * listener - the loop must keep servicing messages for the life of the
 * process.
 */

use super::correlation::CorrelationTable;
use super::envelope::Message;
use super::transport::Mailbox;
use super::types::MessageError;
use log::{debug, error, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handler for inbound messages of a registered type
///
/// Called on the listener task; handlers must not block for long and may be
/// invoked from an arbitrary task context.
pub trait MessageHandler: Send + Sync {
    fn handle_message(&self, message: &Message);
}

struct DispatcherInner {
    // message_type -> registered handlers, snapshot taken outside the lock
    // before invoking
    handlers: RwLock<HashMap<String, Vec<Arc<dyn MessageHandler>>>>,
    correlations: CorrelationTable,
    shutdown: watch::Sender<bool>,
}

/// Inbound message dispatcher
pub struct MessageDispatcher {
    inner: Arc<DispatcherInner>,
}

impl MessageDispatcher {
    #[must_use]
    pub fn new(correlations: CorrelationTable) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(DispatcherInner {
                handlers: RwLock::new(HashMap::new()),
                correlations,
                shutdown,
            }),
        }
    }

    /// Register a handler for a message type; multiple handlers per type
    /// are invoked in registration order
    pub fn register_handler(&self, message_type: impl Into<String>, handler: Arc<dyn MessageHandler>) {
        self.inner
            .handlers
            .write()
            .entry(message_type.into())
            .or_default()
            .push(handler);
    }

    /// Start the listener task draining the given mailbox
    ///
    /// Exits when `shutdown` is signalled or the mailbox closes.
    pub fn start(&self, mailbox: Mailbox) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let mut shutdown_rx = self.inner.shutdown.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    received = mailbox.recv() => {
                        match received {
                            Ok(message) => inner.dispatch(message),
                            Err(MessageError::Closed) => break,
                            Err(e) => warn!("Listener receive error: {}", e),
                        }
                    }
                }
            }
            debug!("Dispatcher listener for pid {} exited", mailbox.pid());
        })
    }

    /// Signal the listener task to exit
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown.send(true);
    }
}

impl Clone for MessageDispatcher {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DispatcherInner {
    fn dispatch(&self, message: Message) {
        if message.is_response() {
            if !self.correlations.complete(message) {
                debug!("Dropped late or unsolicited response");
            }
            return;
        }

        let handlers = self
            .handlers
            .read()
            .get(&message.message_type)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            warn!(
                "No handler registered for message type {:?}, dropping",
                message.message_type
            );
            return;
        }

        for handler in handlers {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler.handle_message(&message)));
            if outcome.is_err() {
                error!(
                    "Handler for {:?} panicked; listener continues",
                    message.message_type
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::command::{LifecycleCommand, LifecycleResponse};
    use crate::message::transport::{InMemoryTransport, Transport};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingHandler {
        count: AtomicUsize,
    }

    impl MessageHandler for CountingHandler {
        fn handle_message(&self, _message: &Message) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_handler_receives_typed_messages() {
        let transport = InMemoryTransport::new(16);
        let mailbox = transport.register(1).unwrap();
        let dispatcher = MessageDispatcher::new(CorrelationTable::new());
        let handler = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });
        dispatcher.register_handler("mvm/lifecycle", handler.clone());
        let listener = dispatcher.start(mailbox);

        let msg = Message::command(
            transport.allocate_id(),
            2,
            LifecycleCommand::IsolateInitialized { isolate_id: 2 },
        );
        transport.send(1, msg).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.count.load(Ordering::SeqCst), 1);

        dispatcher.shutdown();
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn test_response_routed_to_correlation() {
        let transport = InMemoryTransport::new(16);
        let mailbox = transport.register(1).unwrap();
        let correlations = CorrelationTable::new();
        let dispatcher = MessageDispatcher::new(correlations.clone());
        let listener = dispatcher.start(mailbox);

        let request = Message::command(
            transport.allocate_id(),
            1,
            LifecycleCommand::PauseApp { app_id: 4 },
        );
        let rx = correlations.register(request.id);
        let response = Message::response(
            transport.allocate_id(),
            2,
            &request,
            LifecycleResponse::Completed,
        );
        transport.send(1, response).unwrap();

        let received = tokio::time::timeout(Duration::from_millis(200), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.response_to, Some(request.id));

        dispatcher.shutdown();
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn test_unhandled_type_is_dropped() {
        let transport = InMemoryTransport::new(16);
        let mailbox = transport.register(1).unwrap();
        let dispatcher = MessageDispatcher::new(CorrelationTable::new());
        let handler = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });
        dispatcher.register_handler("other/type", handler.clone());
        let listener = dispatcher.start(mailbox);

        let msg = Message::command(
            transport.allocate_id(),
            2,
            LifecycleCommand::IsolateInitialized { isolate_id: 2 },
        );
        transport.send(1, msg).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.count.load(Ordering::SeqCst), 0);

        dispatcher.shutdown();
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn test_mailbox_close_ends_listener() {
        let transport = InMemoryTransport::new(16);
        let mailbox = transport.register(1).unwrap();
        let dispatcher = MessageDispatcher::new(CorrelationTable::new());
        let listener = dispatcher.start(mailbox);

        transport.unregister(1);
        tokio::time::timeout(Duration::from_millis(500), listener)
            .await
            .unwrap()
            .unwrap();
    }
}
