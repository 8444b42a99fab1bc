use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, multipart::Form};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{ImageGenProvider, augment_prompt};
use crate::error::Result;

/// Default Stability AI API base URL
const DEFAULT_BASE_URL: &str = "https://api.stability.ai";

/// Stability AI stable-image provider
pub(crate) struct StabilityProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    style_suffix: String,
}

impl StabilityProvider {
    pub fn new(client: Client, api_key: SecretString, base_url: Option<String>, style_suffix: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            style_suffix,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct BalanceResponse {
    credits: f64,
}

#[async_trait]
impl ImageGenProvider for StabilityProvider {
    async fn generate(&self, prompt: &str, request_id: &str) -> Result<Option<Bytes>> {
        let form = Form::new()
            .text("prompt", augment_prompt(prompt, &self.style_suffix))
            .text("output_format", "png")
            .text("aspect_ratio", "1:1")
            .text("style_preset", "pixel-art")
            .text("seed", "0")
            .text("cfg_scale", "7");

        tracing::info!(provider = "stability_ai", request_id, "starting image generation");

        let response = match self
            .client
            .post(self.url("/v2beta/stable-image/generate/ultra"))
            .bearer_auth(self.api_key.expose_secret())
            .header("Accept", "image/*")
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(provider = "stability_ai", request_id, error = %e, "image generation request failed");
                return Ok(None);
            }
        };

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(provider = "stability_ai", request_id, %status, %body, "image generation rejected");
            return Ok(None);
        }

        match response.bytes().await {
            Ok(image) => {
                tracing::info!(provider = "stability_ai", request_id, size = image.len(), "image generation completed");
                Ok(Some(image))
            }
            Err(e) => {
                tracing::error!(provider = "stability_ai", request_id, error = %e, "failed to read image body");
                Ok(None)
            }
        }
    }

    async fn test_connection(&self) -> bool {
        let response = self
            .client
            .get(self.url("/v1/user/balance"))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                if let Ok(balance) = response.json::<BalanceResponse>().await {
                    tracing::info!(credits = balance.credits, "stability ai balance");
                }
                true
            }
            Ok(response) => {
                tracing::error!(status = %response.status(), "stability ai connection test failed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "stability ai connection test failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "stability_ai"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(base_url: &str) -> StabilityProvider {
        StabilityProvider::new(
            Client::new(),
            SecretString::from("sk-test".to_owned()),
            Some(base_url.to_owned()),
            "pixel art style".to_owned(),
        )
    }

    #[tokio::test]
    async fn returns_image_bytes_on_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2beta/stable-image/generate/ultra"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("accept", "image/*"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG fake".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let image = provider(&server.uri()).generate("a dragon", "r1").await.unwrap();

        assert_eq!(image.as_deref(), Some(&b"\x89PNG fake"[..]));
    }

    #[tokio::test]
    async fn non_success_status_yields_no_image() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2beta/stable-image/generate/ultra"))
            .respond_with(ResponseTemplate::new(402).set_body_string("insufficient credits"))
            .mount(&server)
            .await;

        let image = provider(&server.uri()).generate("a dragon", "r1").await.unwrap();

        assert!(image.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_yields_no_image() {
        let image = provider("http://127.0.0.1:1").generate("a dragon", "r1").await.unwrap();
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn connection_test_reads_balance() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/user/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "credits": 12.5 })))
            .mount(&server)
            .await;

        assert!(provider(&server.uri()).test_connection().await);
    }

    #[tokio::test]
    async fn connection_test_fails_on_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/user/balance"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(!provider(&server.uri()).test_connection().await);
    }
}
