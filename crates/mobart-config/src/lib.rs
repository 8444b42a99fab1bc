#![allow(clippy::must_use_candidate)]

pub mod channel;
mod env;
mod loader;
pub mod notifier;
pub mod provider;
pub mod storage;
pub mod telemetry;

use std::time::Duration;

use serde::Deserialize;

pub use channel::*;
pub use notifier::*;
pub use provider::*;
pub use storage::*;
pub use telemetry::TelemetryConfig;

/// Top-level worker configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Pub/sub channel the worker consumes
    pub channel: ChannelConfig,
    /// Image generation backend
    pub provider: ProviderConfig,
    /// Object storage for finished artifacts
    pub storage: StorageConfig,
    /// Outcome delivery
    #[serde(default)]
    pub notifier: NotifierConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

/// Parse a human duration such as `"30s"` or `"2m"`
///
/// # Errors
///
/// Returns an error if the string is not a valid duration
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration '{value}': {e}"))
}
