//! Provider-specific wire adapters behind the shared completion contract.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod openai;

use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::{ProviderError, ProviderKind};

// Every supported API reports failures as `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    if parsed.error.message.trim().is_empty() {
        return None;
    }
    Some(parsed.error.message)
}

pub(crate) fn send_error(provider: ProviderKind, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(format!("{provider} request timed out: {err}"))
    } else {
        ProviderError::transport(err.to_string())
    }
}

pub(crate) fn decode_error(provider: ProviderKind, err: reqwest::Error) -> ProviderError {
    ProviderError::transport(format!("{provider} response could not be decoded: {err}"))
}

pub(crate) async fn error_from_response(
    provider: ProviderKind,
    response: Response,
) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("{provider} request failed with status {status}"));

    classify_status(status, message)
}

pub(crate) fn classify_status(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => ProviderError::unavailable(message),
        _ => ProviderError::transport(message),
    }
}
