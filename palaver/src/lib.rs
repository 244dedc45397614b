//! Unified facade over the palaver workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core palaver crates and provides convenience utilities
//! and macros for common setup and chat-building flows.

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use pchat;
pub use pcommon;
pub use pmemory;
pub use pobserve;
pub use pprovider;

pub use pchat::{
    estimate_tokens, Chat, ChatError, ChatErrorKind, ChatFuture, ChatMessage, ChatRuntimeHooks,
    ChatService, ChatServiceBuilder, ChatSettingsUpdate, ChatStore, ChatTurn, CompanyCredentials,
    CredentialResolver, InMemoryChatStore, InMemoryCredentialResolver, NoopChatRuntimeHooks,
    TrimReport, AI_ERROR_PREFIX, DEFAULT_HISTORY_WINDOW,
};
pub use pcommon::{BoxFuture, ChatId, CompanyId, MetadataMap, OrganizationId};
pub use pmemory::{default_sqlite_path, SqliteChatStore};
pub use pobserve::{MetricsObservabilityHooks, TracingObservabilityHooks};
pub use pprovider::{
    ChatCompletion, CompletionBackend, HttpCompletionBackend, Message, NoopProviderCallHooks,
    ProviderCallHooks, ProviderConfig, ProviderError, ProviderErrorKind, ProviderFuture,
    ProviderKind, Role, SecretString, UsageReport,
};

pub use runtime::{
    build_runtime_with, http_backend, http_backend_with_timeout, in_memory_runtime,
    in_memory_store, sqlite_runtime, traced_runtime_with, RuntimeBundle, DEFAULT_HTTP_TIMEOUT,
};
pub use util::{
    assistant_message, chat, parse_provider_kind, system_message, user_message,
};
