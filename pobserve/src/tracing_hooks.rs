//! Tracing-based observability hooks for provider calls and chat turns.
//!
//! ```rust
//! use pobserve::TracingObservabilityHooks;
//! use pchat::ChatRuntimeHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use pchat::ChatRuntimeHooks;
use pcommon::ChatId;
use pprovider::{ProviderCallHooks, ProviderError, ProviderKind, UsageReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderCallHooks for TracingObservabilityHooks {
    fn on_call_start(&self, provider: ProviderKind, model: &str) {
        tracing::info!(
            phase = "provider",
            event = "call_start",
            provider = %provider,
            model
        );
    }

    fn on_call_success(
        &self,
        provider: ProviderKind,
        model: &str,
        elapsed: Duration,
        usage: &UsageReport,
    ) {
        tracing::info!(
            phase = "provider",
            event = "call_success",
            provider = %provider,
            model,
            elapsed_ms = elapsed.as_millis() as u64,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens
        );
    }

    fn on_call_failure(
        &self,
        provider: ProviderKind,
        model: &str,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "call_failure",
            provider = %provider,
            model,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ChatRuntimeHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, chat_id: &ChatId, model: &str) {
        tracing::info!(
            phase = "chat",
            event = "turn_start",
            chat_id = %chat_id,
            model
        );
    }

    fn on_turn_completed(
        &self,
        chat_id: &ChatId,
        model: &str,
        elapsed: Duration,
        provider_failed: bool,
    ) {
        tracing::info!(
            phase = "chat",
            event = "turn_completed",
            chat_id = %chat_id,
            model,
            elapsed_ms = elapsed.as_millis() as u64,
            provider_failed
        );
    }

    fn on_provider_failure_captured(&self, chat_id: &ChatId, error: &ProviderError) {
        tracing::warn!(
            phase = "chat",
            event = "provider_failure_captured",
            chat_id = %chat_id,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_history_trimmed(&self, chat_id: &ChatId, evicted_messages: usize, evicted_tokens: u64) {
        tracing::info!(
            phase = "chat",
            event = "history_trimmed",
            chat_id = %chat_id,
            evicted_messages,
            evicted_tokens
        );
    }
}
