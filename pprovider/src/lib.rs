//! Provider adapter layer: one normalized send-message contract over the
//! OpenAI, Anthropic, Gemini, and OpenAI-compatible custom chat APIs.
//!
//! ```rust
//! use pprovider::{Message, ProviderConfig, ProviderKind, Role};
//!
//! let config = ProviderConfig::new(ProviderKind::OpenAi, "sk-live-123");
//! let messages = vec![Message::new(Role::User, "hello")];
//!
//! assert_eq!(config.kind.as_str(), "openai");
//! assert_eq!(messages[0].content, "hello");
//! ```

mod adapters;
mod backend;
mod config;
mod error;
mod hooks;
mod model;

pub use backend::{CompletionBackend, HttpCompletionBackend, ProviderFuture};
pub use config::{ProviderConfig, ProviderKind, SecretString};
pub use error::{ProviderError, ProviderErrorKind};
pub use hooks::{NoopProviderCallHooks, ProviderCallHooks};
pub use model::{ChatCompletion, Message, Role, UsageReport};

pub mod prelude {
    pub use crate::{
        ChatCompletion, CompletionBackend, HttpCompletionBackend, Message, NoopProviderCallHooks,
        ProviderCallHooks, ProviderConfig, ProviderError, ProviderErrorKind, ProviderFuture,
        ProviderKind, Role, SecretString, UsageReport,
    };
}
