//! Per-call provider selection and credential material.
//!
//! ```rust
//! use pprovider::{ProviderConfig, ProviderKind};
//!
//! let kind = ProviderKind::parse("Anthropic").expect("known provider");
//! let config = ProviderConfig::new(kind, "sk-ant-123");
//! assert_eq!(config.kind, ProviderKind::Anthropic);
//! assert_eq!(format!("{config:?}").contains("sk-ant-123"), false);
//! ```

use std::fmt::{Display, Formatter};

use crate::ProviderError;

/// Closed set of supported chat-completion backends. `Custom` is any
/// OpenAI-compatible endpoint reached through a caller-supplied base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
    Custom,
}

impl ProviderKind {
    /// Parses a stored provider name. Unknown names surface as
    /// `UnsupportedProvider` so callers can turn them into transcript
    /// content instead of panicking on an open-ended string.
    pub fn parse(value: &str) -> Result<Self, ProviderError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            "custom" => Ok(Self::Custom),
            _ => Err(ProviderError::unsupported_provider(format!(
                "unsupported provider \"{}\"",
                value.trim()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Custom => "custom",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API key material with a redacted `Debug` and zeroed backing storage on
/// drop, so configs can be logged without leaking credentials.
#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// Resolved credentials for one send-message call. Built fresh per call from
/// the credential resolver and never cached.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: SecretString,
    pub api_secret: Option<SecretString>,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: SecretString::new(api_key),
            api_secret: None,
            base_url: None,
        }
    }

    pub fn with_api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(SecretString::new(api_secret));
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ProviderConfig, ProviderKind, SecretString};
    use crate::ProviderErrorKind;

    #[test]
    fn parse_accepts_known_names_case_insensitively() {
        assert_eq!(ProviderKind::parse("openai"), Ok(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("OpenAI"), Ok(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("claude"), Ok(ProviderKind::Anthropic));
        assert_eq!(ProviderKind::parse("google"), Ok(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse(" custom "), Ok(ProviderKind::Custom));
    }

    #[test]
    fn parse_rejects_unknown_names_with_the_offending_value() {
        let error = ProviderKind::parse("grok").expect_err("unknown provider should fail");
        assert_eq!(error.kind, ProviderErrorKind::UnsupportedProvider);
        assert!(error.message.contains("grok"));
    }

    #[test]
    fn secret_string_redacts_debug_output() {
        let secret = SecretString::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn config_builder_sets_optional_fields() {
        let config = ProviderConfig::new(ProviderKind::Custom, "key")
            .with_api_secret("sk-sekrit-42")
            .with_base_url("https://llm.internal/v1");

        assert!(config.api_secret.is_some());
        assert_eq!(config.base_url.as_deref(), Some("https://llm.internal/v1"));
        // the field name appears in Debug output; the value must not
        assert!(!format!("{config:?}").contains("sk-sekrit-42"));
    }
}
