//! Chat message abstraction
//!
//! Messages follow chat completion API conventions: a role, optional text
//! content, and bookkeeping metadata (id, timestamp).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing instructions.
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
    /// Tool invocation or result message.
    Tool,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a chat history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    /// Text content; `None` for messages that carry no text (e.g. pure
    /// tool-call envelopes).
    pub content: Option<String>,
    #[serde(with = "time::serde::timestamp")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: Some(content.into()),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Message with no text content.
    pub fn empty(role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Ordered conversation history; iteration order is conversation order.
pub type ChatHistory = Vec<ChatMessage>;
