/// Creates a single wire [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use palaver::{Role, pv_msg};
///
/// let message = pv_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! pv_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use palaver::{Role, pv_messages};
///
/// let messages = pv_messages![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! pv_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::pv_msg!($role => $content)),+]
    };
}

/// Creates a [`Chat`](crate::Chat) with an optional system prompt.
///
/// ```rust
/// use palaver::pv_chat;
///
/// let chat = pv_chat!("chat-1", "org-1", "company-1", "gpt-4o-mini", "Be concise.");
/// assert_eq!(chat.messages.len(), 1);
/// ```
#[macro_export]
macro_rules! pv_chat {
    ($chat_id:expr, $organization_id:expr, $company_id:expr, $model:expr $(,)?) => {
        $crate::Chat::new($chat_id, $organization_id, $company_id, $model)
    };
    ($chat_id:expr, $organization_id:expr, $company_id:expr, $model:expr, $system_prompt:expr $(,)?) => {
        $crate::Chat::new($chat_id, $organization_id, $company_id, $model)
            .with_system_prompt($system_prompt)
    };
}
