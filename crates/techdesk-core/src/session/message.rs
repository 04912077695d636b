//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles and message content.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
    /// System-generated message.
    System,
}

/// A single message in a conversation log.
///
/// The text of a message may only change while `is_streaming` is true.
/// Once streaming is cleared the message is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Time-ordered unique identifier (UUID v7).
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub text: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// True while fragments are still arriving.
    #[serde(default)]
    pub is_streaming: bool,
}

impl Message {
    fn new(role: MessageRole, text: impl Into<String>, is_streaming: bool) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            is_streaming,
        }
    }

    /// Creates a final user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text, false)
    }

    /// Creates a final assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text, false)
    }

    /// Creates the empty assistant placeholder that a streamed response fills in.
    pub fn assistant_placeholder() -> Self {
        Self::new(MessageRole::Assistant, String::new(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_starts_empty_and_streaming() {
        let msg = Message::assistant_placeholder();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.text.is_empty());
        assert!(msg.is_streaming);
    }

    #[test]
    fn test_ids_are_unique() {
        let first = Message::user("a");
        let second = Message::user("b");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
