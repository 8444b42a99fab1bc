use std::time::Duration;

use async_trait::async_trait;
use mobart_core::GenerationOutcome;
use reqwest::StatusCode;
use url::Url;

use crate::OutcomeNotifier;
use crate::error::NotifyError;
use crate::payload::StatusUpdate;

/// Reports outcomes to the backend status endpoint
#[derive(Clone)]
pub struct HttpNotifier {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpNotifier {
    /// Create a notifier posting to `base_url` joined with `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the HTTP client cannot be built
    pub fn new(base_url: &Url, path: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let endpoint = base_url
            .join(path)
            .map_err(|e| NotifyError::Config(format!("invalid notification endpoint: {e}")))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl OutcomeNotifier for HttpNotifier {
    async fn notify(&self, outcome: &GenerationOutcome) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&StatusUpdate::from(outcome))
            .send()
            .await?;

        if response.status() == StatusCode::OK {
            tracing::info!(request_id = %outcome.request_id, status = %outcome.status, "backend notified");
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(NotifyError::Rejected { status, message })
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
