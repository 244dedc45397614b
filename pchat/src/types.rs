//! Chat entities, token estimation, and the history-trim policy.
//!
//! ```rust
//! use pchat::{estimate_tokens, Chat, ChatMessage};
//! use pprovider::Role;
//!
//! let mut chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini")
//!     .with_system_prompt("You are concise.");
//! chat.push_message(ChatMessage::new(Role::User, "hello"));
//!
//! assert_eq!(chat.messages.len(), 2);
//! assert_eq!(estimate_tokens("hello"), 2);
//! ```

use std::time::SystemTime;

use pcommon::{ChatId, CompanyId, OrganizationId};
use pprovider::{Message, Role};

pub const DEFAULT_HISTORY_WINDOW: usize = 50;

/// Deterministic local token estimate: Unicode scalar count divided by four,
/// rounded up. Never calls a tokenizer and never depends on the model.
pub fn estimate_tokens(text: &str) -> u32 {
    (text.chars().count() as u32).div_ceil(4)
}

/// One transcript entry. Immutable once appended; the token count is fixed
/// at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: SystemTime,
    pub token_count: u32,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            role,
            token_count: estimate_tokens(&content),
            content,
            timestamp: SystemTime::now(),
        }
    }

    pub fn to_wire(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

/// What a trim pass removed, for bookkeeping and hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimReport {
    pub evicted_messages: usize,
    pub evicted_tokens: u64,
}

/// A persisted conversation scoped to one organization and one
/// provider-company reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub organization_id: OrganizationId,
    pub company_id: CompanyId,
    pub title: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub total_tokens: u64,
    pub max_history_messages: usize,
}

impl Chat {
    pub fn new(
        id: impl Into<ChatId>,
        organization_id: impl Into<OrganizationId>,
        company_id: impl Into<CompanyId>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            company_id: company_id.into(),
            title: String::new(),
            model: model.into(),
            messages: Vec::new(),
            total_tokens: 0,
            max_history_messages: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.push_message(ChatMessage::new(Role::System, prompt));
        self
    }

    pub fn with_history_window(mut self, max_history_messages: usize) -> Self {
        self.max_history_messages = max_history_messages;
        self
    }

    pub fn non_system_len(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| !message.role.is_system())
            .count()
    }

    pub fn wire_messages(&self) -> Vec<Message> {
        self.messages.iter().map(ChatMessage::to_wire).collect()
    }

    /// Appends a message, adds its tokens to the running total, and applies
    /// the history window. The appended message is always retained: the trim
    /// only evicts from the oldest end of the non-system subsequence.
    pub fn push_message(&mut self, message: ChatMessage) -> TrimReport {
        self.total_tokens += u64::from(message.token_count);
        self.messages.push(message);
        self.trim_history()
    }

    /// Evicts the oldest non-system messages beyond `max_history_messages`.
    /// System messages are never evicted; the post-trim order is all system
    /// messages followed by the retained non-system suffix, each keeping its
    /// original relative order.
    pub fn trim_history(&mut self) -> TrimReport {
        let non_system = self.non_system_len();
        if non_system <= self.max_history_messages {
            return TrimReport::default();
        }

        let excess = non_system - self.max_history_messages;
        let mut system_messages = Vec::new();
        let mut retained = Vec::with_capacity(self.max_history_messages);
        let mut evicted_tokens = 0_u64;
        let mut evicted = 0_usize;

        for message in self.messages.drain(..) {
            if message.role.is_system() {
                system_messages.push(message);
            } else if evicted < excess {
                evicted += 1;
                evicted_tokens += u64::from(message.token_count);
            } else {
                retained.push(message);
            }
        }

        system_messages.extend(retained);
        self.messages = system_messages;
        self.total_tokens -= evicted_tokens;

        TrimReport {
            evicted_messages: evicted,
            evicted_tokens,
        }
    }
}

/// Partial settings update. Lowering the window does not re-trim existing
/// history; the next append does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSettingsUpdate {
    pub title: Option<String>,
    pub max_history_messages: Option<usize>,
}

impl ChatSettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn max_history_messages(mut self, max_history_messages: usize) -> Self {
        self.max_history_messages = Some(max_history_messages);
        self
    }
}

/// Result of one send-message transaction: both transcript entries, present
/// on the happy path and on captured provider failures alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::{estimate_tokens, Chat, ChatMessage, ChatSettingsUpdate};
    use pprovider::Role;

    fn token_sum(chat: &Chat) -> u64 {
        chat.messages
            .iter()
            .map(|message| u64::from(message.token_count))
            .sum()
    }

    #[test]
    fn estimator_is_ceil_of_quarter_length() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
        // counted in scalar values, not bytes
        assert_eq!(estimate_tokens("héllo"), 2);
    }

    #[test]
    fn push_message_keeps_the_token_sum_invariant() {
        let mut chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini");
        for content in ["hello", "hi there", "how are you today?"] {
            chat.push_message(ChatMessage::new(Role::User, content));
            assert_eq!(chat.total_tokens, token_sum(&chat));
        }
    }

    #[test]
    fn trim_evicts_oldest_non_system_prefix() {
        // worked example: window of 2, three one-token messages
        let mut chat =
            Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini").with_history_window(2);
        chat.push_message(ChatMessage::new(Role::User, "a"));
        chat.push_message(ChatMessage::new(Role::Assistant, "bb"));
        let report = chat.push_message(ChatMessage::new(Role::User, "ccc"));

        assert_eq!(report.evicted_messages, 1);
        assert_eq!(report.evicted_tokens, 1);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].content, "bb");
        assert_eq!(chat.messages[1].content, "ccc");
        assert_eq!(chat.total_tokens, 2);
    }

    #[test]
    fn trim_never_evicts_system_messages() {
        let mut chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini")
            .with_system_prompt("first rule")
            .with_history_window(1);
        chat.push_message(ChatMessage::new(Role::System, "second rule"));
        chat.push_message(ChatMessage::new(Role::User, "one"));
        chat.push_message(ChatMessage::new(Role::User, "two"));
        chat.push_message(ChatMessage::new(Role::User, "three"));

        assert_eq!(chat.messages.len(), 3);
        assert_eq!(chat.messages[0].content, "first rule");
        assert_eq!(chat.messages[1].content, "second rule");
        assert_eq!(chat.messages[2].content, "three");
        assert_eq!(chat.non_system_len(), 1);
        assert_eq!(chat.total_tokens, token_sum(&chat));
    }

    #[test]
    fn newest_message_survives_every_trim() {
        let mut chat =
            Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini").with_history_window(3);
        for index in 0..20 {
            let content = format!("message number {index}");
            chat.push_message(ChatMessage::new(Role::User, content.clone()));
            assert_eq!(
                chat.messages.last().map(|message| message.content.as_str()),
                Some(content.as_str())
            );
            assert!(chat.non_system_len() <= 3);
        }
    }

    #[test]
    fn trim_is_a_no_op_within_the_window() {
        let mut chat = Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini");
        chat.push_message(ChatMessage::new(Role::User, "hello"));
        let before = chat.clone();
        let report = chat.trim_history();

        assert_eq!(report.evicted_messages, 0);
        assert_eq!(chat, before);
    }

    #[test]
    fn settings_update_builder_sets_fields() {
        let update = ChatSettingsUpdate::new()
            .title("Renamed")
            .max_history_messages(4);

        assert_eq!(update.title.as_deref(), Some("Renamed"));
        assert_eq!(update.max_history_messages, Some(4));
    }

    #[test]
    fn wire_messages_drop_bookkeeping_fields() {
        let mut chat =
            Chat::new("chat-1", "org-1", "company-1", "gpt-4o-mini").with_system_prompt("rules");
        chat.push_message(ChatMessage::new(Role::User, "hello"));

        let wire = chat.wire_messages();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, Role::System);
        assert_eq!(wire[1].content, "hello");
    }
}
