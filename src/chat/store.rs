use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use super::Chat;

/// Process-local chat storage. Nothing survives a restart.
#[derive(Default)]
pub struct ChatStore {
    chats: RwLock<HashMap<Uuid, Chat>>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chat; `false` if the uuid is already taken.
    pub fn create(&self, chat: Chat) -> bool {
        let mut chats = self.chats.write();
        if chats.contains_key(&chat.uuid) {
            return false;
        }
        chats.insert(chat.uuid, chat);
        true
    }

    pub fn get(&self, uuid: &Uuid) -> Option<Chat> {
        self.chats.read().get(uuid).cloned()
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.chats.read().contains_key(uuid)
    }

    /// Apply `f` under the write lock. `None` if the chat does not exist.
    pub fn mutate<R>(&self, uuid: &Uuid, f: impl FnOnce(&mut Chat) -> R) -> Option<R> {
        self.chats.write().get_mut(uuid).map(f)
    }

    pub fn delete(&self, uuid: &Uuid) -> bool {
        self.chats.write().remove(uuid).is_some()
    }

    pub fn count(&self) -> usize {
        self.chats.read().len()
    }
}
