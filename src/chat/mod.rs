//! Conversational endpoint state: in-memory chats, a per-chat busy lock, and
//! the pluggable backend that produces replies.

pub mod bot;
pub mod service;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bot::ChatBackend;
pub use service::{ChatError, ChatService};
pub use store::ChatStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub uuid: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl Chat {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}
