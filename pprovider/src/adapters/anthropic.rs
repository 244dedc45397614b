//! Anthropic messages adapter.
//!
//! System-role entries are hoisted out of the conversation array into the
//! top-level `system` field, and a fixed output-token cap is applied because
//! the API requires one.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ChatCompletion, Message, ProviderConfig, ProviderError, UsageReport};

use super::{decode_error, error_from_response, send_error};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_OUTPUT_TOKENS: u32 = 4096;

pub(crate) async fn send(
    client: &Client,
    config: &ProviderConfig,
    model: &str,
    messages: &[Message],
) -> Result<ChatCompletion, ProviderError> {
    let base_url = config
        .base_url
        .as_deref()
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string());
    let url = format!("{base_url}/v1/messages");
    let payload = build_api_request(model, messages);

    let response = client
        .post(url)
        .header("x-api-key", config.api_key.expose())
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&payload)
        .send()
        .await
        .map_err(|err| send_error(config.kind, err))?;

    if !response.status().is_success() {
        return Err(error_from_response(config.kind, response).await);
    }

    let parsed: AnthropicApiResponse = response
        .json()
        .await
        .map_err(|err| decode_error(config.kind, err))?;

    Ok(completion_from_response(parsed, model))
}

pub(crate) fn build_api_request(model: &str, messages: &[Message]) -> AnthropicApiRequest {
    let system = messages
        .iter()
        .filter(|message| message.role.is_system())
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    AnthropicApiRequest {
        model: model.to_string(),
        max_tokens: ANTHROPIC_MAX_OUTPUT_TOKENS,
        system: if system.is_empty() { None } else { Some(system) },
        messages: messages
            .iter()
            .filter(|message| !message.role.is_system())
            .map(|message| AnthropicApiMessage {
                role: message.role.as_str(),
                content: message.content.clone(),
            })
            .collect(),
    }
}

pub(crate) fn completion_from_response(
    response: AnthropicApiResponse,
    fallback_model: &str,
) -> ChatCompletion {
    let content = response
        .content
        .into_iter()
        .find(|block| block.block_type == "text")
        .and_then(|block| block.text)
        .unwrap_or_default();

    let usage = response
        .usage
        .map(|usage| UsageReport::new(usage.input_tokens, usage.output_tokens, None))
        .unwrap_or_default();

    ChatCompletion::new(content, response.model.unwrap_or_else(|| fallback_model.to_string()))
        .with_usage(usage)
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicApiRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicApiMessage>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicApiMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicApiResponse {
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<AnthropicApiContentBlock>,
    pub usage: Option<AnthropicApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicApiContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicApiUsage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}
