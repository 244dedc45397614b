//! Normalized request and response types shared by every adapter.
//!
//! ```rust
//! use pprovider::{Message, Role, UsageReport};
//!
//! let message = Message::new(Role::User, "hello");
//! assert_eq!(message.role, Role::User);
//!
//! let usage = UsageReport::new(Some(7), Some(3), None);
//! assert_eq!(usage.total_tokens, Some(10));
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

/// Wire-facing view of a transcript entry: role and content only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Provider-reported token usage. Every field is optional; providers that
/// omit a total get one computed from prompt + completion when both exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageReport {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl UsageReport {
    pub fn new(
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
        total_tokens: Option<u32>,
    ) -> Self {
        let total_tokens = total_tokens.or(match (prompt_tokens, completion_tokens) {
            (Some(prompt), Some(completion)) => Some(prompt + completion),
            _ => None,
        });

        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prompt_tokens.is_none()
            && self.completion_tokens.is_none()
            && self.total_tokens.is_none()
    }
}

/// Normalized result of one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub content: String,
    pub model: String,
    pub usage: UsageReport,
}

impl ChatCompletion {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: UsageReport::default(),
        }
    }

    pub fn with_usage(mut self, usage: UsageReport) -> Self {
        self.usage = usage;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatCompletion, Message, Role, UsageReport};

    #[test]
    fn usage_report_fills_missing_total_from_parts() {
        let usage = UsageReport::new(Some(12), Some(8), None);
        assert_eq!(usage.total_tokens, Some(20));
    }

    #[test]
    fn usage_report_keeps_explicit_total() {
        let usage = UsageReport::new(Some(12), Some(8), Some(25));
        assert_eq!(usage.total_tokens, Some(25));
    }

    #[test]
    fn usage_report_leaves_total_absent_when_parts_missing() {
        let usage = UsageReport::new(Some(12), None, None);
        assert_eq!(usage.total_tokens, None);
        assert!(!usage.is_empty());
        assert!(UsageReport::default().is_empty());
    }

    #[test]
    fn completion_builder_attaches_usage() {
        let completion = ChatCompletion::new("hello", "gpt-4o-mini")
            .with_usage(UsageReport::new(Some(1), Some(2), None));

        assert_eq!(completion.content, "hello");
        assert_eq!(completion.usage.total_tokens, Some(3));
    }

    #[test]
    fn role_exposes_wire_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert!(Role::System.is_system());
        assert!(!Role::Assistant.is_system());
        let _ = Message::new(Role::Assistant, "ok");
    }
}
