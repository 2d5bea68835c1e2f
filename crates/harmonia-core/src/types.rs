//! Ephemeral message types shared between transports and the relay.

use serde::{Deserialize, Serialize};

/// A text message received from a chat transport.
///
/// Built once per inbound event and consumed by exactly one handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Identity of the sender (0 when the transport does not provide one)
    pub sender_id: i64,
    /// Conversation the reply must go to
    pub chat_id: i64,
    /// Raw message text
    pub text: String,
}

/// A reply to be sent back to the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingReply {
    /// Reply text
    pub text: String,
}

impl OutgoingReply {
    /// Create a reply from any string-like value
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&'static str> for OutgoingReply {
    fn from(text: &'static str) -> Self {
        Self::new(text)
    }
}
