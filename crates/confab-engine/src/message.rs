//! Message types for the conversation thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Entered by the human.
    User,
    /// Generated by the assistant (including seeded, warning, and fallback
    /// text).
    Bot,
}

/// A single message in the conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message content.
    pub text: String,
    /// Author of the message.
    pub sender: Sender,
    /// Captured at the moment the message was created; used only for
    /// display formatting.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
        }
    }

    /// Whether this message was generated by the assistant.
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.sender, Sender::User);
        assert_eq!(user_msg.text, "Hello");
        assert!(!user_msg.is_bot());

        let bot_msg = Message::bot("Hi there!");
        assert_eq!(bot_msg.sender, Sender::Bot);
        assert!(bot_msg.is_bot());
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let json = serde_json::to_string(&Sender::Bot).unwrap();
        assert_eq!(json, "\"bot\"");
        let json = serde_json::to_string(&Sender::User).unwrap();
        assert_eq!(json, "\"user\"");
    }
}
