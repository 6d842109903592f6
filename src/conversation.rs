// src/conversation.rs
// Conversation records: an append-only message log per persona, plus the
// rolling summary and the watermark of how far that summary reaches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation. Immutable once appended; list order is
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// RFC 3339 timestamp taken at append time
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Role::Assistant, content)
    }

    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// A chat session tied to exactly one persona.
///
/// `summary`, when present, is a compression of `messages[0..last_summarized_at)`
/// and never covers anything past that index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub persona_id: String,
    pub user_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub summary: Option<String>,
    /// Message count the summary accounts for; 0 when never summarized
    pub last_summarized_at: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub persona_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_message_constructors_stamp_time() {
        let message = ChatMessage::user("hello");
        assert_eq!(message.role, Role::User);
        assert!(DateTime::parse_from_rfc3339(&message.timestamp).is_ok());
    }

    #[test]
    fn test_new_conversation_defaults_to_empty_log() {
        let new: NewConversation =
            serde_json::from_str(r#"{"personaId": "p1"}"#).unwrap();
        assert_eq!(new.persona_id, "p1");
        assert!(new.user_id.is_none());
        assert!(new.messages.is_empty());
    }
}
