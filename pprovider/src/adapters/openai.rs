//! OpenAI chat-completions adapter, shared by the `custom` provider for any
//! OpenAI-compatible endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ChatCompletion, Message, ProviderConfig, ProviderError, ProviderKind, UsageReport};

use super::{decode_error, error_from_response, send_error};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub(crate) async fn send(
    client: &Client,
    config: &ProviderConfig,
    model: &str,
    messages: &[Message],
) -> Result<ChatCompletion, ProviderError> {
    let base_url = resolve_base_url(config)?;
    let url = format!("{base_url}/chat/completions");
    let payload = build_api_request(model, messages);

    let response = client
        .post(url)
        .bearer_auth(config.api_key.expose())
        .json(&payload)
        .send()
        .await
        .map_err(|err| send_error(config.kind, err))?;

    if !response.status().is_success() {
        return Err(error_from_response(config.kind, response).await);
    }

    let parsed: OpenAiApiResponse = response
        .json()
        .await
        .map_err(|err| decode_error(config.kind, err))?;

    Ok(completion_from_response(parsed, model))
}

/// `custom` has no default endpoint and must fail before any network call
/// when the base URL is missing.
pub(crate) fn resolve_base_url(config: &ProviderConfig) -> Result<String, ProviderError> {
    let configured = config
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|base| !base.is_empty());

    match (config.kind, configured) {
        (_, Some(base)) => Ok(base.trim_end_matches('/').to_string()),
        (ProviderKind::Custom, None) => Err(ProviderError::configuration(
            "Custom provider requires baseUrl",
        )),
        (_, None) => Ok(OPENAI_BASE_URL.to_string()),
    }
}

pub(crate) fn build_api_request(model: &str, messages: &[Message]) -> OpenAiApiRequest {
    OpenAiApiRequest {
        model: model.to_string(),
        messages: messages
            .iter()
            .map(|message| OpenAiApiMessage {
                role: message.role.as_str(),
                content: message.content.clone(),
            })
            .collect(),
    }
}

pub(crate) fn completion_from_response(
    response: OpenAiApiResponse,
    fallback_model: &str,
) -> ChatCompletion {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    let usage = response
        .usage
        .map(|usage| UsageReport::new(usage.prompt_tokens, usage.completion_tokens, usage.total_tokens))
        .unwrap_or_default();

    ChatCompletion::new(content, response.model.unwrap_or_else(|| fallback_model.to_string()))
        .with_usage(usage)
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiResponse {
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAiApiChoice>,
    pub usage: Option<OpenAiApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChoice {
    pub message: OpenAiApiAssistantMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiAssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}
