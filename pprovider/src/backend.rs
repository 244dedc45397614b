//! The normalized completion contract and its reqwest-backed implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;

use crate::adapters::{anthropic, gemini, openai};
use crate::{
    ChatCompletion, Message, NoopProviderCallHooks, ProviderCallHooks, ProviderConfig,
    ProviderError, ProviderKind,
};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One entry point over every supported provider: a single attempt, no
/// retries, no backoff. Credentials arrive per call and are never retained.
pub trait CompletionBackend: Send + Sync {
    fn send_message<'a>(
        &'a self,
        config: ProviderConfig,
        model: String,
        messages: Vec<Message>,
    ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>>;
}

pub struct HttpCompletionBackend {
    client: Client,
    hooks: Arc<dyn ProviderCallHooks>,
}

impl HttpCompletionBackend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            hooks: Arc::new(NoopProviderCallHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderCallHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    async fn dispatch(
        &self,
        config: &ProviderConfig,
        model: &str,
        messages: &[Message],
    ) -> Result<ChatCompletion, ProviderError> {
        match config.kind {
            ProviderKind::OpenAi | ProviderKind::Custom => {
                openai::send(&self.client, config, model, messages).await
            }
            ProviderKind::Anthropic => anthropic::send(&self.client, config, model, messages).await,
            ProviderKind::Gemini => gemini::send(&self.client, config, model, messages).await,
        }
    }
}

impl std::fmt::Debug for HttpCompletionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionBackend").finish_non_exhaustive()
    }
}

impl CompletionBackend for HttpCompletionBackend {
    fn send_message<'a>(
        &'a self,
        config: ProviderConfig,
        model: String,
        messages: Vec<Message>,
    ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>> {
        Box::pin(async move {
            let provider = config.kind;
            self.hooks.on_call_start(provider, &model);
            let started = Instant::now();

            let result = self.dispatch(&config, &model, &messages).await;
            match &result {
                Ok(completion) => {
                    self.hooks
                        .on_call_success(provider, &model, started.elapsed(), &completion.usage);
                }
                Err(error) => {
                    self.hooks
                        .on_call_failure(provider, &model, started.elapsed(), error);
                }
            }

            result
        })
    }
}
