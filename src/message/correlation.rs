/*!
 * Request/Response Correlation
 * Pairs outbound requests with their eventual responses by message id
 */

use super::envelope::Message;
use crate::core::types::MessageId;
use ahash::RandomState;
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Table of outstanding requests awaiting a correlated response
///
/// A request is registered before its message is handed to the transport,
/// so the response cannot race the registration. Abandoned correlations
/// (timeouts) simply drop the receive side; a reply that arrives later is
/// discarded.
pub struct CorrelationTable {
    pending: Arc<DashMap<MessageId, oneshot::Sender<Message>, RandomState>>,
}

impl CorrelationTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Register an outstanding request; the returned receiver resolves with
    /// the correlated response
    #[must_use]
    pub fn register(&self, request_id: MessageId) -> oneshot::Receiver<Message> {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(request_id, tx);
        rx
    }

    /// Route a response to its waiter
    ///
    /// Returns false when no correlation is outstanding (late reply after a
    /// timeout, or an unsolicited response) - the message is dropped.
    pub fn complete(&self, response: Message) -> bool {
        let Some(request_id) = response.response_to else {
            return false;
        };
        match self.pending.remove(&request_id) {
            Some((_, tx)) => tx.send(response).is_ok(),
            None => {
                debug!("Discarding response to unknown request {}", request_id);
                false
            }
        }
    }

    /// Abandon an outstanding request (caller timed out)
    pub fn abandon(&self, request_id: MessageId) {
        self.pending.remove(&request_id);
    }

    /// Number of outstanding requests
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CorrelationTable {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::command::{LifecycleCommand, LifecycleResponse};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_complete_routes_to_waiter() {
        let table = CorrelationTable::new();
        let request = Message::command(1, 1, LifecycleCommand::PauseApp { app_id: 5 });
        let rx = table.register(request.id);

        let response = Message::response(2, 2, &request, LifecycleResponse::Completed);
        assert!(table.complete(response));

        let received = rx.await.unwrap();
        assert_eq!(received.response_to, Some(1));
        assert_eq!(table.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_late_response_discarded() {
        let table = CorrelationTable::new();
        let request = Message::command(1, 1, LifecycleCommand::PauseApp { app_id: 5 });
        let rx = table.register(request.id);
        table.abandon(request.id);
        drop(rx);

        let response = Message::response(2, 2, &request, LifecycleResponse::Completed);
        assert!(!table.complete(response));
    }

    #[tokio::test]
    async fn test_non_response_not_routed() {
        let table = CorrelationTable::new();
        let command = Message::command(1, 1, LifecycleCommand::ResumeApp { app_id: 5 });
        assert!(!table.complete(command));
    }
}
