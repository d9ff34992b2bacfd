use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use super::{Chat, ChatBackend, ChatMessage, ChatStore, Role};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat {0} not found")]
    NotFound(Uuid),

    #[error("a user message is already being processed")]
    Busy,

    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("chat backend failed: {0:#}")]
    Backend(#[from] anyhow::Error),
}

/// Chats plus the backend that answers them. One reply per chat at a time.
pub struct ChatService {
    store: ChatStore,
    backend: ChatBackend,
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChatService {
    pub fn new(store: ChatStore, backend: ChatBackend) -> Self {
        Self {
            store,
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn create_chat(&self) -> Chat {
        loop {
            let chat = Chat::new();
            if self.store.create(chat.clone()) {
                return chat;
            }
        }
    }

    pub fn require_chat(&self, uuid: &Uuid) -> Result<Chat, ChatError> {
        self.store.get(uuid).ok_or(ChatError::NotFound(*uuid))
    }

    pub fn delete_chat(&self, uuid: &Uuid) -> bool {
        self.locks.lock().remove(uuid);
        self.store.delete(uuid)
    }

    pub fn chat_count(&self) -> usize {
        self.store.count()
    }

    /// Ask the backend for an answer and record both turns.
    ///
    /// Nothing is appended when the backend fails, and a second message for
    /// the same chat while one is in flight gets [`ChatError::Busy`].
    pub async fn reply_to_user(
        &self,
        uuid: &Uuid,
        user_text: &str,
        method: &str,
    ) -> Result<String, ChatError> {
        if !self.store.contains(uuid) {
            return Err(ChatError::NotFound(*uuid));
        }
        let lock = self.locks.lock().entry(*uuid).or_default().clone();
        let _guard = lock.try_lock_owned().map_err(|_| ChatError::Busy)?;

        let history = self.require_chat(uuid)?.messages;
        let answer = self.backend.reply(user_text, &history, method).await?;

        self.store
            .mutate(uuid, |chat| {
                chat.messages.push(ChatMessage {
                    role: Role::User,
                    content: user_text.to_string(),
                });
                chat.messages.push(ChatMessage {
                    role: Role::Assistant,
                    content: answer.clone(),
                });
            })
            .ok_or(ChatError::NotFound(*uuid))?;

        tracing::debug!(chat = %uuid, messages = history.len() + 2, "chat reply recorded");
        Ok(answer)
    }
}
