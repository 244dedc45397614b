//! Conversation manager: bounded chat history with token accounting over
//! the provider adapter layer.
//!
//! ```rust
//! use pchat::{Chat, ChatMessage};
//! use pprovider::Role;
//!
//! let mut chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini")
//!     .with_history_window(2);
//! chat.push_message(ChatMessage::new(Role::User, "hello"));
//!
//! assert_eq!(chat.total_tokens, 2);
//! ```

mod credentials;
mod error;
mod hooks;
mod service;
mod store;
mod types;

pub use credentials::{CompanyCredentials, CredentialResolver, InMemoryCredentialResolver};
pub use error::{ChatError, ChatErrorKind};
pub use hooks::{ChatRuntimeHooks, NoopChatRuntimeHooks};
pub use service::{ChatService, ChatServiceBuilder, AI_ERROR_PREFIX};
pub use store::{ChatFuture, ChatStore, InMemoryChatStore};
pub use types::{
    estimate_tokens, Chat, ChatMessage, ChatSettingsUpdate, ChatTurn, TrimReport,
    DEFAULT_HISTORY_WINDOW,
};

pub mod prelude {
    pub use crate::{
        estimate_tokens, Chat, ChatError, ChatErrorKind, ChatMessage, ChatRuntimeHooks,
        ChatService, ChatServiceBuilder, ChatSettingsUpdate, ChatStore, ChatTurn,
        CompanyCredentials, CredentialResolver, InMemoryChatStore, InMemoryCredentialResolver,
        NoopChatRuntimeHooks, TrimReport, AI_ERROR_PREFIX, DEFAULT_HISTORY_WINDOW,
    };
}
