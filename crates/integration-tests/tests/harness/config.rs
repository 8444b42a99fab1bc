//! Builds worker configuration pointing at a [`MockBackend`](super::backend::MockBackend)

use mobart_config::Config;

use super::backend::MockBackend;

pub struct ConfigBuilder {
    backend_url: String,
    provider: String,
}

impl ConfigBuilder {
    /// DALL-E provider served by the mock backend
    pub fn new(backend: &MockBackend) -> Self {
        let backend_url = backend.url();
        let provider = format!(
            r#"
            type = "openai_dalle"
            api_key = "sk-test"
            base_url = "{backend_url}/v1"
            timeout = "10s"
            "#
        );

        Self { backend_url, provider }
    }

    /// Built-in mock provider that sleeps `delay` and gives up after `timeout`
    pub fn with_mock_provider(mut self, delay: &str, timeout: &str) -> Self {
        self.provider = format!(
            r#"
            type = "mock"
            mock_delay = "{delay}"
            timeout = "{timeout}"
            "#
        );
        self
    }

    pub fn build(self) -> Config {
        let Self { backend_url, provider } = self;

        let raw = format!(
            r#"
            [channel]
            url = "redis://127.0.0.1:1"

            [provider]
            {provider}

            [storage]
            bucket = "assets"
            region = "us-east-1"
            access_key_id = "AKIDTEST"
            secret_access_key = "test-secret"
            endpoint_url = "{backend_url}"
            timeout = "10s"

            [notifier.http]
            base_url = "{backend_url}"
            timeout = "5s"
            "#
        );

        Config::from_toml(&raw).expect("test configuration should be valid")
    }
}
