use std::sync::Arc;
use std::time::Duration;

use mobart_config::{ProviderConfig, ProviderType, parse_duration};
use reqwest::Client;
use secrecy::SecretString;

use crate::{
    error::{ImageGenError, Result},
    provider::{
        ImageGenProvider,
        leonardo::{LeonardoProvider, PollSettings},
        mock::MockImageGenProvider,
        openai::OpenAiDalleProvider,
        stability::StabilityProvider,
    },
};

/// Build the configured image generation provider
///
/// Each provider type maps to its own independent implementation; the
/// returned handle is shared across all requests.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn ImageGenProvider>> {
    let timeout = duration(&config.timeout)?;

    tracing::debug!(provider = ?config.provider_type, "initializing image generation provider");

    let provider: Arc<dyn ImageGenProvider> = match config.provider_type {
        ProviderType::StabilityAi => Arc::new(StabilityProvider::new(
            http_client(timeout)?,
            resolve_api_key(config)?,
            config.base_url.clone(),
            config.style_suffix.clone(),
        )),
        ProviderType::OpenaiDalle => Arc::new(OpenAiDalleProvider::new(
            http_client(timeout)?,
            resolve_api_key(config)?,
            config.base_url.clone(),
            config.model.clone(),
            config.style_suffix.clone(),
        )),
        ProviderType::LeonardoAi => Arc::new(LeonardoProvider::new(
            http_client(timeout)?,
            resolve_api_key(config)?,
            config.base_url.clone(),
            config.model.clone(),
            config.style_suffix.clone(),
            PollSettings {
                interval: duration(&config.poll_interval)?,
                max_polls: config.max_polls,
            },
        )),
        ProviderType::Mock => Arc::new(MockImageGenProvider::new(duration(&config.mock_delay)?)?),
    };

    tracing::info!(provider = provider.name(), "using image generation provider");

    Ok(provider)
}

/// HTTP client whose every call is bounded by the generation timeout
fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .build()
        .map_err(|e| ImageGenError::Config(format!("failed to build HTTP client: {e}")))
}

fn resolve_api_key(config: &ProviderConfig) -> Result<SecretString> {
    config.api_key.clone().ok_or_else(|| {
        ImageGenError::Config(format!("API key required for provider {:?}", config.provider_type))
    })
}

fn duration(value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| ImageGenError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_provider_needs_no_key() {
        let provider = build_provider(&ProviderConfig::new(ProviderType::Mock)).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[tokio::test]
    async fn builds_each_keyed_provider() {
        for (provider_type, name) in [
            (ProviderType::StabilityAi, "stability_ai"),
            (ProviderType::OpenaiDalle, "openai_dalle"),
            (ProviderType::LeonardoAi, "leonardo_ai"),
        ] {
            let mut config = ProviderConfig::new(provider_type);
            config.api_key = Some(SecretString::from("key".to_owned()));

            let provider = build_provider(&config).unwrap();
            assert_eq!(provider.name(), name);
        }
    }

    #[tokio::test]
    async fn missing_key_is_a_config_error() {
        let result = build_provider(&ProviderConfig::new(ProviderType::StabilityAi));
        assert!(matches!(result, Err(ImageGenError::Config(_))));
    }

    #[tokio::test]
    async fn invalid_timeout_is_a_config_error() {
        let mut config = ProviderConfig::new(ProviderType::Mock);
        config.timeout = "whenever".to_owned();

        assert!(matches!(build_provider(&config), Err(ImageGenError::Config(_))));
    }
}
