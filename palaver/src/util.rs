//! Small convenience constructors for common types.

use crate::{Chat, Message, ProviderKind, Role};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn chat(
    id: impl Into<String>,
    organization_id: impl Into<String>,
    company_id: impl Into<String>,
    model: impl Into<String>,
) -> Chat {
    Chat::new(id.into(), organization_id.into(), company_id.into(), model)
}

pub fn parse_provider_kind(value: &str) -> Option<ProviderKind> {
    ProviderKind::parse(value).ok()
}
