//! Runtime wiring helpers for chat service usage.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{
    ChatError, ChatService, ChatStore, HttpCompletionBackend, InMemoryChatStore,
    InMemoryCredentialResolver, SqliteChatStore, TracingObservabilityHooks,
};

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(90);

/// Everything an application needs to run chats: the store, the credential
/// registry, and the service wired over both.
#[derive(Clone)]
pub struct RuntimeBundle {
    pub store: Arc<dyn ChatStore>,
    pub credentials: Arc<InMemoryCredentialResolver>,
    pub service: ChatService,
}

pub fn in_memory_store() -> Arc<dyn ChatStore> {
    Arc::new(InMemoryChatStore::new())
}

pub fn http_backend() -> Result<HttpCompletionBackend, ChatError> {
    http_backend_with_timeout(DEFAULT_HTTP_TIMEOUT)
}

pub fn http_backend_with_timeout(timeout: Duration) -> Result<HttpCompletionBackend, ChatError> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ChatError::invalid_request(err.to_string()))?;
    Ok(HttpCompletionBackend::new(client))
}

pub fn in_memory_runtime() -> Result<RuntimeBundle, ChatError> {
    build_runtime_with(in_memory_store())
}

pub fn sqlite_runtime(path: impl AsRef<Path>) -> Result<RuntimeBundle, ChatError> {
    build_runtime_with(Arc::new(SqliteChatStore::new(path)?))
}

pub fn build_runtime_with(store: Arc<dyn ChatStore>) -> Result<RuntimeBundle, ChatError> {
    let credentials = Arc::new(InMemoryCredentialResolver::new());
    let backend = Arc::new(http_backend()?);

    let service = ChatService::new(
        Arc::clone(&store),
        Arc::clone(&credentials) as Arc<dyn crate::CredentialResolver>,
        backend,
    );

    Ok(RuntimeBundle {
        store,
        credentials,
        service,
    })
}

/// Same wiring as [`build_runtime_with`], with tracing hooks installed on
/// both the provider backend and the chat service.
pub fn traced_runtime_with(store: Arc<dyn ChatStore>) -> Result<RuntimeBundle, ChatError> {
    let credentials = Arc::new(InMemoryCredentialResolver::new());
    let backend = Arc::new(http_backend()?.with_hooks(Arc::new(TracingObservabilityHooks)));

    let service = ChatService::builder(
        Arc::clone(&store),
        Arc::clone(&credentials) as Arc<dyn crate::CredentialResolver>,
        backend,
    )
    .hooks(Arc::new(TracingObservabilityHooks))
    .build();

    Ok(RuntimeBundle {
        store,
        credentials,
        service,
    })
}
