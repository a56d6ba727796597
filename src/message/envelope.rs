/*!
 * Message Envelope
 * Immutable envelope with type tag, sender, correlation id, and payload
 */

use super::command::{LifecycleCommand, LifecycleResponse};
use super::types::{MessageError, MessageResult};
use crate::core::limits::MAX_MESSAGE_SIZE;
use crate::core::types::{MessageId, Pid};
use serde::{Deserialize, Serialize};

/// Message type tag used by the lifecycle protocol
pub const LIFECYCLE_MESSAGE_TYPE: &str = "mvm/lifecycle";

/// Opaque message payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Command(LifecycleCommand),
    Response(LifecycleResponse),
    Bytes(Vec<u8>),
    Strings(Vec<String>),
}

/// Immutable message envelope
///
/// Created by the sender, owned by the delivery subsystem while in flight,
/// and owned by the receiver after dequeue. `id` is assigned at send time
/// and is the correlation key for request/response pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub message_type: String,
    pub sender: Pid,
    /// Set on responses: the id of the request being answered
    pub response_to: Option<MessageId>,
    pub payload: Payload,
}

impl Message {
    /// Build a lifecycle command message (request or notification)
    #[must_use]
    pub fn command(id: MessageId, sender: Pid, command: LifecycleCommand) -> Self {
        Self {
            id,
            message_type: LIFECYCLE_MESSAGE_TYPE.to_string(),
            sender,
            response_to: None,
            payload: Payload::Command(command),
        }
    }

    /// Build the response correlated to an inbound request
    #[must_use]
    pub fn response(
        id: MessageId,
        sender: Pid,
        request: &Message,
        response: LifecycleResponse,
    ) -> Self {
        Self {
            id,
            message_type: request.message_type.clone(),
            sender,
            response_to: Some(request.id),
            payload: Payload::Response(response),
        }
    }

    /// Build a message with an arbitrary payload
    #[must_use]
    pub fn with_payload(
        id: MessageId,
        message_type: impl Into<String>,
        sender: Pid,
        payload: Payload,
    ) -> Self {
        Self {
            id,
            message_type: message_type.into(),
            sender,
            response_to: None,
            payload,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_response(&self) -> bool {
        self.response_to.is_some()
    }

    /// Encode for transports that cross process boundaries
    ///
    /// Rejects messages whose encoded form exceeds `MAX_MESSAGE_SIZE`.
    pub fn encode(&self) -> MessageResult<Vec<u8>> {
        let bytes = bincode::serialize(self).map_err(|e| MessageError::Codec(e.to_string()))?;
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(MessageError::Codec(format!(
                "encoded message is {} bytes, limit is {}",
                bytes.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        Ok(bytes)
    }

    /// Decode a wire-encoded message
    pub fn decode(bytes: &[u8]) -> MessageResult<Self> {
        bincode::deserialize(bytes).map_err(|e| MessageError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_envelope() {
        let msg = Message::command(7, 1, LifecycleCommand::PauseApp { app_id: 17 });
        assert_eq!(msg.message_type, LIFECYCLE_MESSAGE_TYPE);
        assert_eq!(msg.sender, 1);
        assert!(!msg.is_response());
    }

    #[test]
    fn test_response_correlates_to_request() {
        let request = Message::command(7, 1, LifecycleCommand::ResumeApp { app_id: 2 });
        let response = Message::response(8, 2, &request, LifecycleResponse::Completed);
        assert_eq!(response.response_to, Some(7));
        assert_eq!(response.message_type, request.message_type);
        assert!(response.is_response());
    }

    #[test]
    fn test_wire_round_trip() {
        let msg = Message::command(
            42,
            3,
            LifecycleCommand::DestroyApp {
                app_id: 17,
                unconditional: true,
            },
        );
        let bytes = msg.encode().unwrap();
        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_oversized_message_rejected() {
        let msg = Message::with_payload(
            1,
            "bulk/data",
            1,
            Payload::Bytes(vec![0u8; MAX_MESSAGE_SIZE + 1]),
        );
        assert!(matches!(msg.encode(), Err(MessageError::Codec(_))));
    }

    #[test]
    fn test_decode_garbage_is_codec_error() {
        let result = Message::decode(&[0xff; 3]);
        assert!(matches!(result, Err(MessageError::Codec(_))));
    }
}
