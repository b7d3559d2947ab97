//! Upstream LLM providers behind the compliance proxy.
//!
//! Each provider client owns a `reqwest::Client` with its credentials in
//! default headers. [`Providers`] picks the client for a request.

pub mod claude;
pub mod error;
pub mod openai;
pub mod types;

use std::time::Duration;

pub use claude::ClaudeClient;
pub use error::ProviderError;
pub use openai::OpenAiClient;
pub use types::{ChatMessage, Completion, Parameters, Provider, UnknownProvider};

use crate::config::ConsoleConfig;

/// The configured provider clients. A provider without an API key has no
/// client and fails per request.
#[derive(Clone, Default)]
pub struct Providers {
    openai: Option<OpenAiClient>,
    claude: Option<ClaudeClient>,
}

impl Providers {
    /// Build clients for every provider that has an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured key cannot be used as a header or an
    /// HTTP client cannot be built.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ProviderError> {
        let timeout: Duration = config.request_timeout;
        Ok(Self {
            openai: OpenAiClient::from_config(&config.openai, timeout)?,
            claude: ClaudeClient::from_config(&config.claude, timeout)?,
        })
    }

    #[must_use]
    pub const fn is_configured(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAi => self.openai.is_some(),
            Provider::Claude => self.claude.is_some(),
        }
    }

    /// Run one completion against `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotConfigured`] when the provider has no
    /// client, otherwise whatever the client returns.
    pub async fn complete(
        &self,
        provider: Provider,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        parameters: &Parameters,
    ) -> Result<Completion, ProviderError> {
        match provider {
            Provider::OpenAi => {
                let client = self
                    .openai
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured(provider))?;
                client.complete(messages, system_prompt, parameters).await
            }
            Provider::Claude => {
                let client = self
                    .claude
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured(provider))?;
                client.complete(messages, system_prompt, parameters).await
            }
        }
    }
}

/// Client construction needs a process-wide rustls provider, which
/// `main` installs at startup.
#[cfg(test)]
pub(crate) fn install_test_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[tokio::test]
    async fn test_unconfigured_provider_fails_without_network() {
        let providers = Providers::default();
        let err = providers
            .complete(
                Provider::Claude,
                &[ChatMessage::new("user", "hi")],
                None,
                &Parameters::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(Provider::Claude)));
    }

    #[test]
    fn test_from_config_builds_keyed_clients_only() {
        install_test_crypto();
        let mut config = ConsoleConfig::local("http://localhost:3000").unwrap();
        config.openai.api_key = Some(SecretString::from("sk-Q8v2LmZ7rT4wK1pN9xB6cH3jF5"));

        let providers = Providers::from_config(&config).unwrap();
        assert!(providers.is_configured(Provider::OpenAi));
        assert!(!providers.is_configured(Provider::Claude));
    }

    #[test]
    fn test_key_with_newline_is_rejected() {
        install_test_crypto();
        let mut config = ConsoleConfig::local("http://localhost:3000").unwrap();
        config.claude.api_key = Some(SecretString::from("sk-ant\nbroken"));

        let result = Providers::from_config(&config);
        assert!(matches!(result, Err(ProviderError::InvalidKey(Provider::Claude))));
    }
}
