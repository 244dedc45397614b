//! Operational hook contract for conversation turns.

use std::time::Duration;

use pcommon::ChatId;
use pprovider::ProviderError;

pub trait ChatRuntimeHooks: Send + Sync {
    fn on_turn_start(&self, _chat_id: &ChatId, _model: &str) {}

    fn on_turn_completed(
        &self,
        _chat_id: &ChatId,
        _model: &str,
        _elapsed: Duration,
        _provider_failed: bool,
    ) {
    }

    /// Fired when a provider failure is captured into the transcript instead
    /// of propagating to the caller.
    fn on_provider_failure_captured(&self, _chat_id: &ChatId, _error: &ProviderError) {}

    fn on_history_trimmed(&self, _chat_id: &ChatId, _evicted_messages: usize, _evicted_tokens: u64) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatRuntimeHooks;

impl ChatRuntimeHooks for NoopChatRuntimeHooks {}
