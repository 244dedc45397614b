//! Metrics-based observability hooks for provider calls and chat turns.
//!
//! ```rust
//! use pobserve::MetricsObservabilityHooks;
//! use pprovider::ProviderCallHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderCallHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use pchat::ChatRuntimeHooks;
use pcommon::ChatId;
use pprovider::{ProviderCallHooks, ProviderError, ProviderKind, UsageReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderCallHooks for MetricsObservabilityHooks {
    fn on_call_start(&self, provider: ProviderKind, model: &str) {
        metrics::counter!(
            "palaver_provider_call_start_total",
            "provider" => provider.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
    }

    fn on_call_success(
        &self,
        provider: ProviderKind,
        model: &str,
        elapsed: Duration,
        usage: &UsageReport,
    ) {
        metrics::counter!(
            "palaver_provider_call_success_total",
            "provider" => provider.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "palaver_provider_call_duration_seconds",
            "provider" => provider.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
        if let Some(total) = usage.total_tokens {
            metrics::counter!(
                "palaver_provider_tokens_total",
                "provider" => provider.to_string(),
                "model" => model.to_string()
            )
            .increment(u64::from(total));
        }
    }

    fn on_call_failure(
        &self,
        provider: ProviderKind,
        model: &str,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "palaver_provider_call_failure_total",
            "provider" => provider.to_string(),
            "model" => model.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "palaver_provider_call_duration_seconds",
            "provider" => provider.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatRuntimeHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _chat_id: &ChatId, model: &str) {
        metrics::counter!(
            "palaver_chat_turn_start_total",
            "model" => model.to_string()
        )
        .increment(1);
    }

    fn on_turn_completed(
        &self,
        _chat_id: &ChatId,
        model: &str,
        elapsed: Duration,
        provider_failed: bool,
    ) {
        metrics::counter!(
            "palaver_chat_turn_completed_total",
            "model" => model.to_string(),
            "provider_failed" => provider_failed.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "palaver_chat_turn_duration_seconds",
            "model" => model.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_provider_failure_captured(&self, _chat_id: &ChatId, error: &ProviderError) {
        metrics::counter!(
            "palaver_chat_provider_failure_captured_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_history_trimmed(&self, _chat_id: &ChatId, evicted_messages: usize, evicted_tokens: u64) {
        metrics::counter!("palaver_chat_history_evicted_messages_total")
            .increment(evicted_messages as u64);
        metrics::counter!("palaver_chat_history_evicted_tokens_total").increment(evicted_tokens);
    }
}
