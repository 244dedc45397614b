//! Credential resolution contract for provider companies.
//!
//! The resolver hands back the raw stored record; converting its free-form
//! provider name into a [`pprovider::ProviderKind`] is deferred to the send
//! path so an unknown name becomes transcript content, not a request failure.

use std::collections::HashMap;
use std::sync::Mutex;

use pcommon::{BoxFuture, CompanyId, OrganizationId};
use pprovider::{ProviderConfig, ProviderError, ProviderKind};

use crate::ChatError;

/// Raw provider-company record as stored by the tenant administration layer.
#[derive(Clone, PartialEq, Eq)]
pub struct CompanyCredentials {
    pub provider: String,
    pub api_key: String,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
}

impl CompanyCredentials {
    pub fn new(provider: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.into(),
            api_secret: None,
            base_url: None,
        }
    }

    pub fn with_api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(api_secret.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn into_provider_config(self) -> Result<ProviderConfig, ProviderError> {
        let kind = ProviderKind::parse(&self.provider)?;
        let mut config = ProviderConfig::new(kind, self.api_key);
        if let Some(api_secret) = self.api_secret {
            config = config.with_api_secret(api_secret);
        }
        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }
}

impl std::fmt::Debug for CompanyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompanyCredentials")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub trait CredentialResolver: Send + Sync {
    fn resolve<'a>(
        &'a self,
        organization_id: &'a OrganizationId,
        company_id: &'a CompanyId,
    ) -> BoxFuture<'a, Result<Option<CompanyCredentials>, ChatError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialResolver {
    entries: Mutex<HashMap<(OrganizationId, CompanyId), CompanyCredentials>>,
}

impl InMemoryCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        organization_id: impl Into<OrganizationId>,
        company_id: impl Into<CompanyId>,
        credentials: CompanyCredentials,
    ) -> Result<(), ChatError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ChatError::store("credential resolver lock poisoned"))?;

        entries.insert((organization_id.into(), company_id.into()), credentials);
        Ok(())
    }
}

impl CredentialResolver for InMemoryCredentialResolver {
    fn resolve<'a>(
        &'a self,
        organization_id: &'a OrganizationId,
        company_id: &'a CompanyId,
    ) -> BoxFuture<'a, Result<Option<CompanyCredentials>, ChatError>> {
        Box::pin(async move {
            let entries = self
                .entries
                .lock()
                .map_err(|_| ChatError::store("credential resolver lock poisoned"))?;

            Ok(entries
                .get(&(organization_id.clone(), company_id.clone()))
                .cloned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CompanyCredentials, CredentialResolver, InMemoryCredentialResolver};
    use pcommon::{CompanyId, OrganizationId};
    use pprovider::{ProviderErrorKind, ProviderKind};

    #[test]
    fn record_converts_to_provider_config() {
        let config = CompanyCredentials::new("anthropic", "sk-ant-123")
            .with_base_url("https://gateway.internal")
            .into_provider_config()
            .expect("known provider should convert");

        assert_eq!(config.kind, ProviderKind::Anthropic);
        assert_eq!(config.base_url.as_deref(), Some("https://gateway.internal"));
    }

    #[test]
    fn unknown_provider_name_surfaces_as_unsupported() {
        let error = CompanyCredentials::new("grok", "key")
            .into_provider_config()
            .expect_err("unknown provider should fail");

        assert_eq!(error.kind, ProviderErrorKind::UnsupportedProvider);
        assert!(error.message.contains("grok"));
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let credentials = CompanyCredentials::new("openai", "sk-live-123").with_api_secret("shh");
        let rendered = format!("{credentials:?}");

        assert!(!rendered.contains("sk-live-123"));
        assert!(!rendered.contains("shh"));
        assert!(rendered.contains("openai"));
    }

    #[tokio::test]
    async fn resolver_is_scoped_by_organization_and_company() {
        let resolver = InMemoryCredentialResolver::new();
        resolver
            .insert("org-1", "company-1", CompanyCredentials::new("openai", "key"))
            .expect("insert should succeed");

        let hit = resolver
            .resolve(&OrganizationId::from("org-1"), &CompanyId::from("company-1"))
            .await
            .expect("resolve should succeed");
        assert!(hit.is_some());

        let miss = resolver
            .resolve(&OrganizationId::from("org-2"), &CompanyId::from("company-1"))
            .await
            .expect("resolve should succeed");
        assert!(miss.is_none());
    }
}
