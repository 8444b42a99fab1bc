use serde::Deserialize;
use url::Url;

/// Where outcomes are reported
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    /// POST outcomes to the backend status endpoint
    #[serde(default)]
    pub http: Option<HttpNotifierConfig>,
    /// Publish completion events on the redis completion channel
    #[serde(default)]
    pub redis: Option<RedisNotifierConfig>,
}

impl NotifierConfig {
    pub const fn is_empty(&self) -> bool {
        self.http.is_none() && self.redis.is_none()
    }
}

/// Backend status endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpNotifierConfig {
    /// Backend base URL
    pub base_url: Url,
    /// Status update path, joined onto `base_url`
    #[serde(default = "default_path")]
    pub path: String,
    /// Upper bound on one notification
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

/// Completion-channel publisher
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisNotifierConfig {
    /// Upper bound on one publish
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for RedisNotifierConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_path() -> String {
    "/api/internal/update_status".to_owned()
}

fn default_timeout() -> String {
    "30s".to_owned()
}
