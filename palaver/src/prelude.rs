//! Common imports for most palaver applications.

pub use crate::{
    assistant_message, build_runtime_with, chat, http_backend, http_backend_with_timeout,
    in_memory_runtime, in_memory_store, parse_provider_kind, sqlite_runtime, system_message,
    traced_runtime_with, user_message, RuntimeBundle, DEFAULT_HTTP_TIMEOUT,
};
pub use crate::{pv_chat, pv_messages, pv_msg};
pub use crate::{
    estimate_tokens, BoxFuture, Chat, ChatCompletion, ChatError, ChatErrorKind, ChatId,
    ChatMessage, ChatRuntimeHooks, ChatService, ChatServiceBuilder, ChatSettingsUpdate, ChatStore,
    ChatTurn, CompanyCredentials, CompanyId, CompletionBackend, CredentialResolver,
    HttpCompletionBackend, InMemoryChatStore, InMemoryCredentialResolver, Message,
    MetricsObservabilityHooks, OrganizationId, ProviderConfig, ProviderError, ProviderErrorKind,
    ProviderKind, Role, SecretString, SqliteChatStore, TracingObservabilityHooks, TrimReport,
    UsageReport, AI_ERROR_PREFIX, DEFAULT_HISTORY_WINDOW,
};
