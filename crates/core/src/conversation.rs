//! Conversation message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in the assistant conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message id
    pub id: Uuid,
    /// Who sent the message
    pub sender: Sender,
    /// Message text
    pub text: String,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    /// Create a new message
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ConversationMessage::user("create a project");
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.text, "create a project");

        let msg = ConversationMessage::assistant("What should the project be called?");
        assert_eq!(msg.sender, Sender::Assistant);
    }

    #[test]
    fn test_unique_ids() {
        let a = ConversationMessage::user("one");
        let b = ConversationMessage::user("one");
        assert_ne!(a.id, b.id);
    }
}
