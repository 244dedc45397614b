//! Chat storage contract and a basic in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use pcommon::ChatId;

use crate::{Chat, ChatError};

pub type ChatFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Keyed chat persistence. Each call is atomic per chat id; the conversation
/// manager layers its own per-id serialization on top for multi-step turns.
pub trait ChatStore: Send + Sync {
    fn get<'a>(&'a self, chat_id: &'a ChatId) -> ChatFuture<'a, Result<Option<Chat>, ChatError>>;

    fn save<'a>(&'a self, chat: Chat) -> ChatFuture<'a, Result<Chat, ChatError>>;

    fn delete<'a>(&'a self, chat_id: &'a ChatId) -> ChatFuture<'a, Result<bool, ChatError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    chats: Mutex<HashMap<ChatId, Chat>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for InMemoryChatStore {
    fn get<'a>(&'a self, chat_id: &'a ChatId) -> ChatFuture<'a, Result<Option<Chat>, ChatError>> {
        Box::pin(async move {
            let chats = self
                .chats
                .lock()
                .map_err(|_| ChatError::store("chat store lock poisoned"))?;

            Ok(chats.get(chat_id).cloned())
        })
    }

    fn save<'a>(&'a self, chat: Chat) -> ChatFuture<'a, Result<Chat, ChatError>> {
        Box::pin(async move {
            let mut chats = self
                .chats
                .lock()
                .map_err(|_| ChatError::store("chat store lock poisoned"))?;

            chats.insert(chat.id.clone(), chat.clone());
            Ok(chat)
        })
    }

    fn delete<'a>(&'a self, chat_id: &'a ChatId) -> ChatFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move {
            let mut chats = self
                .chats
                .lock()
                .map_err(|_| ChatError::store("chat store lock poisoned"))?;

            Ok(chats.remove(chat_id).is_some())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatStore, InMemoryChatStore};
    use crate::Chat;
    use pcommon::ChatId;

    #[tokio::test]
    async fn save_get_delete_round_trip() {
        let store = InMemoryChatStore::new();
        let chat_id = ChatId::from("chat-1");

        assert!(store.get(&chat_id).await.expect("get should succeed").is_none());

        let chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini").with_title("Demo");
        store.save(chat).await.expect("save should succeed");

        let loaded = store
            .get(&chat_id)
            .await
            .expect("get should succeed")
            .expect("chat should exist");
        assert_eq!(loaded.title, "Demo");

        assert!(store.delete(&chat_id).await.expect("delete should succeed"));
        assert!(!store.delete(&chat_id).await.expect("delete should succeed"));
    }

    #[tokio::test]
    async fn save_overwrites_by_id() {
        let store = InMemoryChatStore::new();
        let original = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini").with_title("One");
        let replacement =
            Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini").with_title("Two");

        store.save(original).await.expect("save should succeed");
        store.save(replacement).await.expect("save should succeed");

        let loaded = store
            .get(&ChatId::from("chat-1"))
            .await
            .expect("get should succeed")
            .expect("chat should exist");
        assert_eq!(loaded.title, "Two");
    }
}
