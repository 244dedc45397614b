//! Conversation manager: append, send-message orchestration, settings.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use pcommon::ChatId;
use pprovider::{ChatCompletion, CompletionBackend, ProviderError, Role};

use crate::{
    Chat, ChatError, ChatMessage, ChatRuntimeHooks, ChatSettingsUpdate, ChatStore, ChatTurn,
    CredentialResolver, NoopChatRuntimeHooks,
};

/// Marker prepended to assistant entries that record a provider failure.
pub const AI_ERROR_PREFIX: &str = "⚠️ AI Error: ";

type ChatLockMap = Mutex<HashMap<ChatId, Arc<tokio::sync::Mutex<()>>>>;

/// Owns all mutation of chat transcripts and token bookkeeping.
///
/// Mutating operations serialize per chat id through a keyed async mutex, so
/// two concurrent send-message turns against the same chat cannot interleave
/// their read-modify-write cycles within this process. Deployments running
/// several instances against one store still need external serialization.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    credentials: Arc<dyn CredentialResolver>,
    backend: Arc<dyn CompletionBackend>,
    hooks: Arc<dyn ChatRuntimeHooks>,
    chat_locks: Arc<ChatLockMap>,
}

pub struct ChatServiceBuilder {
    store: Arc<dyn ChatStore>,
    credentials: Arc<dyn CredentialResolver>,
    backend: Arc<dyn CompletionBackend>,
    hooks: Arc<dyn ChatRuntimeHooks>,
}

impl ChatServiceBuilder {
    pub fn hooks(mut self, hooks: Arc<dyn ChatRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> ChatService {
        ChatService {
            store: self.store,
            credentials: self.credentials,
            backend: self.backend,
            hooks: self.hooks,
            chat_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ChatStore>,
        credentials: Arc<dyn CredentialResolver>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self::builder(store, credentials, backend).build()
    }

    pub fn builder(
        store: Arc<dyn ChatStore>,
        credentials: Arc<dyn CredentialResolver>,
        backend: Arc<dyn CompletionBackend>,
    ) -> ChatServiceBuilder {
        ChatServiceBuilder {
            store,
            credentials,
            backend,
            hooks: Arc::new(NoopChatRuntimeHooks),
        }
    }

    pub async fn create_chat(&self, chat: Chat) -> Result<Chat, ChatError> {
        self.store.save(chat).await
    }

    pub async fn get_chat(&self, chat_id: &ChatId) -> Result<Chat, ChatError> {
        self.store
            .get(chat_id)
            .await?
            .ok_or_else(|| ChatError::not_found("Chat not found"))
    }

    pub async fn delete_chat(&self, chat_id: &ChatId) -> Result<bool, ChatError> {
        let guard = self.lock_chat(chat_id).await?;
        let removed = self.store.delete(chat_id).await?;
        drop(guard);
        self.discard_chat_lock(chat_id)?;
        Ok(removed)
    }

    /// Estimates tokens, stamps the message, appends it, applies the history
    /// window, and persists the chat in one store write. Empty content is
    /// accepted; length policy belongs to callers.
    pub async fn append_message(
        &self,
        chat_id: &ChatId,
        role: Role,
        content: impl Into<String>,
    ) -> Result<ChatMessage, ChatError> {
        let _guard = self.lock_chat(chat_id).await?;
        self.append_message_locked(chat_id, role, content.into())
            .await
    }

    /// The full send-message transaction. The user message commits first and
    /// is never rolled back; everything from the provider call onward is
    /// converted into transcript content on failure, so only the chat lookup
    /// and credential resolution can raise to the caller.
    pub async fn send_message(
        &self,
        chat_id: &ChatId,
        user_text: impl Into<String>,
    ) -> Result<ChatTurn, ChatError> {
        let _guard = self.lock_chat(chat_id).await?;

        let chat = self.get_chat(chat_id).await?;
        let credentials = self
            .credentials
            .resolve(&chat.organization_id, &chat.company_id)
            .await?
            .ok_or_else(|| ChatError::not_found("AI Company not found"))?;

        self.hooks.on_turn_start(chat_id, &chat.model);
        let started = Instant::now();

        let user_message = self
            .append_message_locked(chat_id, Role::User, user_text.into())
            .await?;

        // Reload so the provider sees exactly the persisted post-trim window,
        // the same view any other reader of the store would get.
        let chat = self.get_chat(chat_id).await?;

        let outcome = self.call_provider(&chat, credentials).await;
        let (assistant_content, provider_failed) = match outcome {
            Ok(completion) => (completion.content, false),
            Err(error) => {
                self.hooks.on_provider_failure_captured(chat_id, &error);
                (format!("{AI_ERROR_PREFIX}{}", error.message), true)
            }
        };

        let assistant_message = self
            .append_message_locked(chat_id, Role::Assistant, assistant_content)
            .await?;

        self.hooks
            .on_turn_completed(chat_id, &chat.model, started.elapsed(), provider_failed);

        Ok(ChatTurn {
            user_message,
            assistant_message,
        })
    }

    /// Applies title and window updates without re-trimming: a lowered
    /// window takes effect on the next append.
    pub async fn update_settings(
        &self,
        chat_id: &ChatId,
        update: ChatSettingsUpdate,
    ) -> Result<Chat, ChatError> {
        let _guard = self.lock_chat(chat_id).await?;

        let mut chat = self.get_chat(chat_id).await?;
        if let Some(title) = update.title {
            chat.title = title;
        }
        if let Some(max_history_messages) = update.max_history_messages {
            chat.max_history_messages = max_history_messages;
        }

        self.store.save(chat).await
    }

    async fn append_message_locked(
        &self,
        chat_id: &ChatId,
        role: Role,
        content: String,
    ) -> Result<ChatMessage, ChatError> {
        let mut chat = self.get_chat(chat_id).await?;
        let message = ChatMessage::new(role, content);

        let report = chat.push_message(message.clone());
        if report.evicted_messages > 0 {
            self.hooks
                .on_history_trimmed(chat_id, report.evicted_messages, report.evicted_tokens);
        }

        self.store.save(chat).await?;
        Ok(message)
    }

    async fn call_provider(
        &self,
        chat: &Chat,
        credentials: crate::CompanyCredentials,
    ) -> Result<ChatCompletion, ProviderError> {
        // Provider-name parsing happens here so an unsupported value fails
        // inside the captured region rather than as a request error.
        let config = credentials.into_provider_config()?;
        self.backend
            .send_message(config, chat.model.clone(), chat.wire_messages())
            .await
    }

    async fn lock_chat(
        &self,
        chat_id: &ChatId,
    ) -> Result<tokio::sync::OwnedMutexGuard<()>, ChatError> {
        let lock = {
            let mut locks = self
                .chat_locks
                .lock()
                .map_err(|_| ChatError::store("chat lock table poisoned"))?;

            Arc::clone(locks.entry(chat_id.clone()).or_default())
        };

        Ok(lock.lock_owned().await)
    }

    /// Removes the chat's guard entry once nothing else holds or awaits it,
    /// so the lock table does not grow with every chat id ever touched.
    /// A strong count above one means a holder or waiter still has a handle;
    /// the entry stays so they keep serializing against the same mutex.
    fn discard_chat_lock(&self, chat_id: &ChatId) -> Result<(), ChatError> {
        let mut locks = self
            .chat_locks
            .lock()
            .map_err(|_| ChatError::store("chat lock table poisoned"))?;

        if let Some(lock) = locks.get(chat_id)
            && Arc::strong_count(lock) == 1
        {
            locks.remove(chat_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{ChatService, AI_ERROR_PREFIX};
    use crate::{
        Chat, ChatErrorKind, CompanyCredentials, InMemoryChatStore, InMemoryCredentialResolver,
    };
    use pcommon::ChatId;
    use pprovider::{
        ChatCompletion, CompletionBackend, Message, ProviderConfig, ProviderError, ProviderFuture,
        Role, UsageReport,
    };

    #[derive(Default)]
    struct FakeBackend {
        captured: Mutex<Option<(String, Vec<Message>)>>,
        failure: Option<ProviderError>,
    }

    impl FakeBackend {
        fn failing(error: ProviderError) -> Self {
            Self {
                captured: Mutex::new(None),
                failure: Some(error),
            }
        }
    }

    impl CompletionBackend for FakeBackend {
        fn send_message<'a>(
            &'a self,
            _config: ProviderConfig,
            model: String,
            messages: Vec<Message>,
        ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>> {
            Box::pin(async move {
                *self.captured.lock().expect("captured lock") = Some((model.clone(), messages));
                match &self.failure {
                    Some(error) => Err(error.clone()),
                    None => Ok(ChatCompletion::new("assistant reply", model)
                        .with_usage(UsageReport::new(Some(7), Some(3), None))),
                }
            })
        }
    }

    fn service_with_backend(backend: FakeBackend) -> (ChatService, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let resolver = InMemoryCredentialResolver::new();
        resolver
            .insert("org-1", "company-1", CompanyCredentials::new("openai", "key"))
            .expect("insert should succeed");

        let service = ChatService::new(
            Arc::new(InMemoryChatStore::new()),
            Arc::new(resolver),
            Arc::clone(&backend) as Arc<dyn CompletionBackend>,
        );
        (service, backend)
    }

    #[tokio::test]
    async fn send_message_forwards_the_persisted_window() {
        let (service, backend) = service_with_backend(FakeBackend::default());
        let chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini")
            .with_system_prompt("be terse");
        service.create_chat(chat).await.expect("create should succeed");

        let chat_id = ChatId::from("chat-1");
        let turn = service
            .send_message(&chat_id, "hello")
            .await
            .expect("turn should succeed");

        assert_eq!(turn.user_message.content, "hello");
        assert_eq!(turn.assistant_message.content, "assistant reply");

        let (model, messages) = backend
            .captured
            .lock()
            .expect("captured lock")
            .clone()
            .expect("request should be captured");
        assert_eq!(model, "gpt-4o-mini");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "hello");
    }

    #[tokio::test]
    async fn provider_failure_becomes_an_assistant_entry() {
        let (service, _backend) =
            service_with_backend(FakeBackend::failing(ProviderError::transport("socket reset")));
        let chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini");
        service.create_chat(chat).await.expect("create should succeed");

        let chat_id = ChatId::from("chat-1");
        let turn = service
            .send_message(&chat_id, "hello")
            .await
            .expect("turn should still succeed");

        assert_eq!(
            turn.assistant_message.content,
            format!("{AI_ERROR_PREFIX}socket reset")
        );

        let stored = service.get_chat(&chat_id).await.expect("chat should load");
        assert_eq!(stored.messages.len(), 2);
        assert_eq!(stored.messages[0].content, "hello");
    }

    #[tokio::test]
    async fn delete_chat_releases_its_lock_entry() {
        let (service, _backend) = service_with_backend(FakeBackend::default());
        let chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini");
        service.create_chat(chat).await.expect("create should succeed");

        let chat_id = ChatId::from("chat-1");
        service
            .append_message(&chat_id, Role::User, "hello")
            .await
            .expect("append should succeed");
        assert_eq!(service.chat_locks.lock().expect("lock table").len(), 1);

        assert!(service
            .delete_chat(&chat_id)
            .await
            .expect("delete should succeed"));
        assert!(service.chat_locks.lock().expect("lock table").is_empty());

        let error = service
            .get_chat(&chat_id)
            .await
            .expect_err("deleted chat should be gone");
        assert_eq!(error.kind, ChatErrorKind::NotFound);
    }

    #[tokio::test]
    async fn send_message_to_missing_chat_raises_not_found() {
        let (service, _backend) = service_with_backend(FakeBackend::default());

        let error = service
            .send_message(&ChatId::from("missing"), "hello")
            .await
            .expect_err("missing chat should fail");
        assert_eq!(error.kind, ChatErrorKind::NotFound);
        assert_eq!(error.message, "Chat not found");
    }
}
