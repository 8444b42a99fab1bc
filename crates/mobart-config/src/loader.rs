use std::path::Path;

use secrecy::ExposeSecret;

use crate::{Config, parse_duration};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a section is incomplete or a duration does not parse
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_channel()?;
        self.validate_provider()?;
        self.validate_storage()?;
        self.validate_notifier()?;
        Ok(())
    }

    fn validate_channel(&self) -> anyhow::Result<()> {
        if self.channel.url.is_empty() {
            anyhow::bail!("channel.url must not be empty");
        }

        if self.channel.request_channel.is_empty() {
            anyhow::bail!("channel.request_channel must not be empty");
        }

        Ok(())
    }

    fn validate_provider(&self) -> anyhow::Result<()> {
        let provider = &self.provider;

        if provider.provider_type.requires_api_key()
            && provider.api_key.as_ref().is_none_or(|key| key.expose_secret().is_empty())
        {
            anyhow::bail!("provider {:?} requires an api_key", provider.provider_type);
        }

        parse_duration(&provider.timeout).map_err(|e| anyhow::anyhow!("provider.timeout: {e}"))?;
        parse_duration(&provider.poll_interval).map_err(|e| anyhow::anyhow!("provider.poll_interval: {e}"))?;
        parse_duration(&provider.mock_delay).map_err(|e| anyhow::anyhow!("provider.mock_delay: {e}"))?;

        if provider.max_polls == 0 {
            anyhow::bail!("provider.max_polls must be greater than 0");
        }

        Ok(())
    }

    fn validate_storage(&self) -> anyhow::Result<()> {
        let storage = &self.storage;

        if storage.bucket.is_empty() {
            anyhow::bail!("storage.bucket must not be empty");
        }

        if storage.max_width == 0 || storage.max_height == 0 {
            anyhow::bail!("storage.max_width and storage.max_height must be greater than 0");
        }

        if storage.access_key_id.is_some() != storage.secret_access_key.is_some() {
            anyhow::bail!("storage.access_key_id and storage.secret_access_key must be set together");
        }

        parse_duration(&storage.timeout).map_err(|e| anyhow::anyhow!("storage.timeout: {e}"))?;

        Ok(())
    }

    fn validate_notifier(&self) -> anyhow::Result<()> {
        if self.notifier.is_empty() {
            anyhow::bail!("at least one notifier must be configured (notifier.http or notifier.redis)");
        }

        if let Some(ref http) = self.notifier.http {
            parse_duration(&http.timeout).map_err(|e| anyhow::anyhow!("notifier.http.timeout: {e}"))?;
        }

        if let Some(ref redis) = self.notifier.redis {
            parse_duration(&redis.timeout).map_err(|e| anyhow::anyhow!("notifier.redis.timeout: {e}"))?;
        }

        Ok(())
    }
}
