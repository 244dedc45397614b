//! Gemini generateContent adapter.
//!
//! Non-system history maps `user -> user`, `assistant -> model`; the final
//! message's content is submitted as the new user turn. A chat with no
//! non-system messages still produces one (empty) turn, since the API
//! rejects an empty `contents` array.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ChatCompletion, Message, ProviderConfig, ProviderError, Role, UsageReport};

use super::{decode_error, error_from_response, send_error};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

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
        .unwrap_or_else(|| GEMINI_BASE_URL.to_string());
    let url = format!("{base_url}/v1beta/models/{model}:generateContent");
    let payload = build_api_request(messages);

    let response = client
        .post(url)
        .query(&[("key", config.api_key.expose())])
        .json(&payload)
        .send()
        .await
        .map_err(|err| send_error(config.kind, err))?;

    if !response.status().is_success() {
        return Err(error_from_response(config.kind, response).await);
    }

    let parsed: GeminiApiResponse = response
        .json()
        .await
        .map_err(|err| decode_error(config.kind, err))?;

    Ok(completion_from_response(parsed, model))
}

pub(crate) fn build_api_request(messages: &[Message]) -> GeminiApiRequest {
    let system = messages
        .iter()
        .filter(|message| message.role.is_system())
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let conversation = messages
        .iter()
        .filter(|message| !message.role.is_system())
        .collect::<Vec<_>>();

    let (history, current) = match conversation.split_last() {
        Some((last, history)) => (history, last.content.clone()),
        None => (&[][..], String::new()),
    };

    let mut contents = history
        .iter()
        .map(|message| GeminiApiContent {
            role: gemini_role(message.role),
            parts: vec![GeminiApiPart {
                text: Some(message.content.clone()),
            }],
        })
        .collect::<Vec<_>>();

    contents.push(GeminiApiContent {
        role: "user",
        parts: vec![GeminiApiPart {
            text: Some(current),
        }],
    });

    GeminiApiRequest {
        system_instruction: if system.is_empty() {
            None
        } else {
            Some(GeminiApiSystemInstruction {
                parts: vec![GeminiApiPart { text: Some(system) }],
            })
        },
        contents,
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    }
}

pub(crate) fn completion_from_response(
    response: GeminiApiResponse,
    fallback_model: &str,
) -> ChatCompletion {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .unwrap_or_default();

    let usage = response
        .usage_metadata
        .map(|usage| {
            UsageReport::new(
                usage.prompt_token_count,
                usage.candidates_token_count,
                usage.total_token_count,
            )
        })
        .unwrap_or_default();

    let model = response
        .model_version
        .unwrap_or_else(|| fallback_model.to_string());

    ChatCompletion::new(content, model).with_usage(usage)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiApiSystemInstruction>,
    pub contents: Vec<GeminiApiContent>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiSystemInstruction {
    pub parts: Vec<GeminiApiPart>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiContent {
    pub role: &'static str,
    pub parts: Vec<GeminiApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiApiPart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiApiCandidate>,
    pub usage_metadata: Option<GeminiApiUsageMetadata>,
    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiCandidate {
    pub content: Option<GeminiApiCandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiApiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiUsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::{build_api_request, completion_from_response, GeminiApiResponse};
    use crate::{Message, Role};

    #[test]
    fn history_maps_roles_and_last_message_becomes_the_new_turn() {
        let messages = vec![
            Message::new(Role::System, "be terse"),
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "hello"),
            Message::new(Role::User, "and?"),
        ];

        let request = build_api_request(&messages);
        assert!(request.system_instruction.is_some());
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[1].role, "model");
        assert_eq!(request.contents[2].role, "user");
        assert_eq!(request.contents[2].parts[0].text.as_deref(), Some("and?"));
    }

    #[test]
    fn system_only_chat_submits_one_empty_turn() {
        let request = build_api_request(&[Message::new(Role::System, "be terse")]);
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[0].parts[0].text.as_deref(), Some(""));
    }

    #[test]
    fn request_serializes_with_camel_case_field_names() {
        let request = build_api_request(&[
            Message::new(Role::System, "be terse"),
            Message::new(Role::User, "hi"),
        ]);

        let encoded = serde_json::to_value(&request).expect("request should serialize");
        assert!(encoded.get("systemInstruction").is_some());
        assert!(encoded.get("contents").is_some());
    }

    #[test]
    fn first_candidate_text_becomes_the_content() {
        let body = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "answer"}]}}],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 2, "totalTokenCount": 7},
            "modelVersion": "gemini-2.0-flash"
        }"#;
        let parsed: GeminiApiResponse = serde_json::from_str(body).expect("response should parse");

        let completion = completion_from_response(parsed, "gemini-2.0-flash");
        assert_eq!(completion.content, "answer");
        assert_eq!(completion.model, "gemini-2.0-flash");
        assert_eq!(completion.usage.total_tokens, Some(7));
    }

    #[test]
    fn response_without_candidates_yields_empty_content() {
        let parsed: GeminiApiResponse =
            serde_json::from_str("{}").expect("response should parse");

        let completion = completion_from_response(parsed, "gemini-2.0-flash");
        assert_eq!(completion.content, "");
        assert_eq!(completion.model, "gemini-2.0-flash");
        assert!(completion.usage.is_empty());
    }
}
