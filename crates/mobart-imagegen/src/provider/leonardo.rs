use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ImageGenProvider, augment_prompt};
use crate::error::Result;

/// Default Leonardo AI API base URL
const DEFAULT_BASE_URL: &str = "https://cloud.leonardo.ai/api/rest/v1";

/// Leonardo AI generations provider
///
/// Leonardo generates asynchronously: a job is created, polled until it
/// settles, and the first finished image is downloaded.
pub(crate) struct LeonardoProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: Option<String>,
    style_suffix: String,
    poll_interval: Duration,
    max_polls: u32,
}

/// Polling behaviour for asynchronous generations
pub(crate) struct PollSettings {
    pub interval: Duration,
    pub max_polls: u32,
}

impl LeonardoProvider {
    pub fn new(
        client: Client,
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        style_suffix: String,
        poll: PollSettings,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            model,
            style_suffix,
            poll_interval: poll.interval,
            max_polls: poll.max_polls,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Create a generation job, returning its id
    async fn create_job(&self, prompt: &str, request_id: &str) -> Option<String> {
        let wire_request = CreateGenerationRequest {
            prompt: augment_prompt(prompt, &self.style_suffix),
            model_id: self.model.as_deref(),
            width: 1024,
            height: 1024,
            num_images: 1,
        };

        let response = match self
            .client
            .post(self.url("/generations"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&wire_request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(provider = "leonardo_ai", request_id, error = %e, "generation request failed");
                return None;
            }
        };

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(provider = "leonardo_ai", request_id, %status, %body, "generation rejected");
            return None;
        }

        response
            .json::<CreateGenerationResponse>()
            .await
            .map(|created| created.sd_generation_job.generation_id)
            .inspect_err(|e| tracing::error!(provider = "leonardo_ai", request_id, error = %e, "failed to parse Leonardo job"))
            .ok()
    }

    /// Poll a job until it settles, returning the first image URL
    async fn await_job(&self, generation_id: &str, request_id: &str) -> Option<String> {
        for attempt in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let response = match self
                .client
                .get(self.url(&format!("/generations/{generation_id}")))
                .bearer_auth(self.api_key.expose_secret())
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    tracing::error!(provider = "leonardo_ai", request_id, status = %response.status(), "status poll rejected");
                    return None;
                }
                Err(e) => {
                    tracing::error!(provider = "leonardo_ai", request_id, error = %e, "status poll failed");
                    return None;
                }
            };

            let job: GenerationStatusResponse = match response.json().await {
                Ok(job) => job,
                Err(e) => {
                    tracing::error!(provider = "leonardo_ai", request_id, error = %e, "failed to parse Leonardo status");
                    return None;
                }
            };

            let Some(generation) = job.generations_by_pk else {
                tracing::error!(provider = "leonardo_ai", request_id, generation_id, "unknown generation");
                return None;
            };

            match generation.status {
                JobStatus::Complete => {
                    let url = generation.generated_images.into_iter().next().map(|image| image.url);
                    if url.is_none() {
                        tracing::error!(provider = "leonardo_ai", request_id, generation_id, "completed generation has no images");
                    }
                    return url;
                }
                JobStatus::Failed => {
                    tracing::error!(provider = "leonardo_ai", request_id, generation_id, "generation failed upstream");
                    return None;
                }
                JobStatus::Pending => {
                    tracing::debug!(provider = "leonardo_ai", request_id, attempt, "generation still pending");
                }
            }
        }

        tracing::error!(
            provider = "leonardo_ai",
            request_id,
            max_polls = self.max_polls,
            "generation did not finish in time"
        );
        None
    }

    async fn download(&self, url: &str, request_id: &str) -> Option<Bytes> {
        let response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::error!(provider = "leonardo_ai", request_id, status = %response.status(), "image download rejected");
                return None;
            }
            Err(e) => {
                tracing::error!(provider = "leonardo_ai", request_id, error = %e, "image download failed");
                return None;
            }
        };

        response
            .bytes()
            .await
            .inspect_err(|e| tracing::error!(provider = "leonardo_ai", request_id, error = %e, "failed to read image"))
            .ok()
    }
}

#[derive(Serialize)]
struct CreateGenerationRequest<'a> {
    prompt: String,
    #[serde(rename = "modelId", skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
    width: u32,
    height: u32,
    num_images: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGenerationResponse {
    sd_generation_job: GenerationJob,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationJob {
    generation_id: String,
}

#[derive(Deserialize)]
struct GenerationStatusResponse {
    generations_by_pk: Option<Generation>,
}

#[derive(Deserialize)]
struct Generation {
    status: JobStatus,
    #[serde(default)]
    generated_images: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum JobStatus {
    Pending,
    Complete,
    Failed,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: String,
}

#[async_trait]
impl ImageGenProvider for LeonardoProvider {
    async fn generate(&self, prompt: &str, request_id: &str) -> Result<Option<Bytes>> {
        tracing::info!(provider = "leonardo_ai", request_id, "starting image generation");

        let Some(generation_id) = self.create_job(prompt, request_id).await else {
            return Ok(None);
        };

        tracing::debug!(provider = "leonardo_ai", request_id, %generation_id, "generation job created");

        let Some(url) = self.await_job(&generation_id, request_id).await else {
            return Ok(None);
        };

        let image = self.download(&url, request_id).await;

        if let Some(ref image) = image {
            tracing::info!(provider = "leonardo_ai", request_id, size = image.len(), "image generation completed");
        }

        Ok(image)
    }

    async fn test_connection(&self) -> bool {
        match self
            .client
            .get(self.url("/me"))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!(status = %response.status(), "Leonardo connection test failed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Leonardo connection test failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "leonardo_ai"
    }
}
