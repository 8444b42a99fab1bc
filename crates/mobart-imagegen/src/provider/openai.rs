use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ImageGenProvider, augment_prompt};
use crate::error::Result;

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default image model
const DEFAULT_MODEL: &str = "dall-e-3";

/// `OpenAI` DALL-E image generation provider
pub(crate) struct OpenAiDalleProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    style_suffix: String,
}

impl OpenAiDalleProvider {
    pub fn new(
        client: Client,
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        style_suffix: String,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            style_suffix,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Wire format for the `OpenAI` image generation API request
#[derive(Serialize)]
struct DalleRequest<'a> {
    model: &'a str,
    prompt: String,
    n: u32,
    size: &'static str,
    quality: &'static str,
    response_format: &'static str,
}

/// Wire format for the `OpenAI` image generation API response
#[derive(Deserialize)]
struct DalleResponse {
    data: Vec<DalleImage>,
}

#[derive(Deserialize)]
struct DalleImage {
    b64_json: Option<String>,
}

#[async_trait]
impl ImageGenProvider for OpenAiDalleProvider {
    async fn generate(&self, prompt: &str, request_id: &str) -> Result<Option<Bytes>> {
        let wire_request = DalleRequest {
            model: &self.model,
            prompt: augment_prompt(prompt, &self.style_suffix),
            n: 1,
            size: "1024x1024",
            quality: "hd",
            response_format: "b64_json",
        };

        tracing::info!(provider = "openai_dalle", model = %self.model, request_id, "starting image generation");

        let response = match self
            .client
            .post(self.url("/images/generations"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&wire_request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(provider = "openai_dalle", request_id, error = %e, "image generation request failed");
                return Ok(None);
            }
        };

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(provider = "openai_dalle", request_id, %status, %body, "DALL-E API error");
            return Ok(None);
        }

        let wire_response: DalleResponse = match response.json().await {
            Ok(wire_response) => wire_response,
            Err(e) => {
                tracing::error!(provider = "openai_dalle", request_id, error = %e, "failed to parse DALL-E response");
                return Ok(None);
            }
        };

        let Some(encoded) = wire_response.data.into_iter().next().and_then(|image| image.b64_json) else {
            tracing::error!(provider = "openai_dalle", request_id, "DALL-E response carried no b64_json image");
            return Ok(None);
        };

        let image = match STANDARD.decode(encoded) {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(provider = "openai_dalle", request_id, error = %e, "invalid base64 image");
                return Ok(None);
            }
        };

        tracing::info!(provider = "openai_dalle", request_id, size = image.len(), "image generation completed");

        Ok(Some(Bytes::from(image)))
    }

    async fn test_connection(&self) -> bool {
        match self
            .client
            .get(self.url("/models"))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!(status = %response.status(), "OpenAI connection test failed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "OpenAI connection test failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "openai_dalle"
    }
}
