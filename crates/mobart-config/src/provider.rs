use secrecy::SecretString;
use serde::Deserialize;

/// Image generation provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider type
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    /// API key, required for every provider except `mock`
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Provider-specific model identifier
    #[serde(default)]
    pub model: Option<String>,
    /// Upper bound on one generation call
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Appended to every prompt; empty disables augmentation
    #[serde(default = "default_style_suffix")]
    pub style_suffix: String,
    /// Delay between status polls for providers that generate asynchronously
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Maximum status polls before giving up
    ///
    /// The default leaves the poll loop room to finish inside the default
    /// `timeout`, so the provider reports its own give-up first.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    /// Simulated latency of the mock provider
    #[serde(default = "default_mock_delay")]
    pub mock_delay: String,
}

impl ProviderConfig {
    /// Minimal configuration for the given provider type
    pub fn new(provider_type: ProviderType) -> Self {
        Self {
            provider_type,
            api_key: None,
            base_url: None,
            model: None,
            timeout: default_timeout(),
            style_suffix: default_style_suffix(),
            poll_interval: default_poll_interval(),
            max_polls: default_max_polls(),
            mock_delay: default_mock_delay(),
        }
    }
}

/// Supported image generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Stability AI stable-image API
    StabilityAi,
    /// Leonardo AI generations API
    LeonardoAi,
    /// `OpenAI` DALL-E image generation
    OpenaiDalle,
    /// Deterministic placeholder image, no network access
    Mock,
}

impl ProviderType {
    pub const fn requires_api_key(self) -> bool {
        !matches!(self, Self::Mock)
    }
}

fn default_timeout() -> String {
    "2m".to_owned()
}

fn default_style_suffix() -> String {
    "pixel art style, game asset, clean background, high quality, detailed".to_owned()
}

fn default_poll_interval() -> String {
    "3s".to_owned()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_polls() -> u32 {
    35
}

fn default_mock_delay() -> String {
    "0s".to_owned()
}
