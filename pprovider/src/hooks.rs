//! Operational hook contract for provider calls.

use std::time::Duration;

use crate::{ProviderError, ProviderKind, UsageReport};

pub trait ProviderCallHooks: Send + Sync {
    fn on_call_start(&self, _provider: ProviderKind, _model: &str) {}

    fn on_call_success(
        &self,
        _provider: ProviderKind,
        _model: &str,
        _elapsed: Duration,
        _usage: &UsageReport,
    ) {
    }

    fn on_call_failure(
        &self,
        _provider: ProviderKind,
        _model: &str,
        _elapsed: Duration,
        _error: &ProviderError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProviderCallHooks;

impl ProviderCallHooks for NoopProviderCallHooks {}
