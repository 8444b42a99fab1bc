use std::any::Any;
use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use mobart_core::{GenerationOutcome, GenerationRequest, OutcomeStatus, RawRequest};
use mobart_imagegen::ImageGenProvider;
use mobart_notifier::OutcomeNotifier;
use mobart_storage::ArtifactStore;
use mobart_telemetry::PipelineMetrics;
use tracing::Instrument;

/// Reason reported when the provider produced no image
pub const GENERATION_FAILED: &str = "Image generation failed";

/// Reason reported when the store did not persist the image
pub const STORAGE_FAILED: &str = "S3 upload failed";

/// Upper bounds on the external calls of one request
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub generation: Duration,
    pub storage: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            generation: Duration::from_secs(120),
            storage: Duration::from_secs(30),
        }
    }
}

/// Turns one request into exactly one reported outcome
pub struct Pipeline {
    provider: Arc<dyn ImageGenProvider>,
    store: Arc<dyn ArtifactStore>,
    notifier: Arc<dyn OutcomeNotifier>,
    timeouts: Timeouts,
    metrics: PipelineMetrics,
}

/// How a guarded step ended
enum Step<T> {
    Value(T),
    Absent,
    Unexpected(String),
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn ImageGenProvider>,
        store: Arc<dyn ArtifactStore>,
        notifier: Arc<dyn OutcomeNotifier>,
    ) -> Self {
        Self {
            provider,
            store,
            notifier,
            timeouts: Timeouts::default(),
            metrics: PipelineMetrics::new(),
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub(crate) const fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Process a decoded payload
    ///
    /// Invalid requests are logged and dropped: no outcome is produced and
    /// nothing is notified. Every valid request yields exactly one outcome,
    /// which is handed to the notifier once before being returned.
    pub async fn process(&self, raw: RawRequest) -> Option<GenerationOutcome> {
        let request = match raw.validate() {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, "dropping invalid request");
                self.metrics.record_rejected("invalid");
                return None;
            }
        };

        let span = tracing::info_span!(
            "request",
            request_id = %request.request_id,
            user_id = %request.user_id,
            provider = self.provider.name(),
        );

        async {
            tracing::info!(prompt = %request.prompt, "processing request");

            let outcome = self.run(&request).await;
            self.report(&outcome).await;

            Some(outcome)
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &GenerationRequest) -> GenerationOutcome {
        let started = Instant::now();

        let generation = guarded(
            "generation",
            self.timeouts.generation,
            self.provider.generate(&request.prompt, &request.request_id),
        )
        .await;

        let image = match generation {
            Step::Value(image) if !image.is_empty() => image,
            Step::Value(_) | Step::Absent => return GenerationOutcome::failed(&request.request_id, GENERATION_FAILED),
            Step::Unexpected(detail) => return unexpected(&request.request_id, &detail),
        };

        let key = request.storage_key();
        let stored = guarded("storage", self.timeouts.storage, self.store.store(image, &key)).await;

        match stored {
            Step::Value(_) => GenerationOutcome::completed(&request.request_id, key, started.elapsed()),
            Step::Absent => GenerationOutcome::failed(&request.request_id, STORAGE_FAILED),
            Step::Unexpected(detail) => unexpected(&request.request_id, &detail),
        }
    }

    async fn report(&self, outcome: &GenerationOutcome) {
        let provider = self.provider.name();

        self.metrics.record_outcome(outcome.status.as_ref(), provider);

        match outcome.status {
            OutcomeStatus::Completed => {
                let elapsed = outcome.elapsed_seconds.unwrap_or_default();
                self.metrics.record_duration(Duration::from_secs_f64(elapsed), provider);
                tracing::info!(key = %outcome.content_reference, elapsed_seconds = elapsed, "request completed");
            }
            OutcomeStatus::Failed => {
                tracing::error!(reason = outcome.error_reason.as_deref().unwrap_or_default(), "request failed");
            }
        }

        if let Err(e) = self.notifier.notify(outcome).await {
            tracing::error!(notifier = self.notifier.name(), error = %e, "failed to deliver outcome");
        }
    }
}

/// Run an external call under a deadline, containing panics
///
/// A timeout counts as the call producing nothing.
async fn guarded<T, E, F>(step: &'static str, limit: Duration, call: F) -> Step<T>
where
    F: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    match tokio::time::timeout(limit, AssertUnwindSafe(call).catch_unwind()).await {
        Err(_) => {
            tracing::error!(step, timeout = ?limit, "step timed out");
            Step::Absent
        }
        Ok(Err(panic)) => Step::Unexpected(panic_message(panic.as_ref())),
        Ok(Ok(Err(e))) => Step::Unexpected(e.to_string()),
        Ok(Ok(Ok(Some(value)))) => Step::Value(value),
        Ok(Ok(Ok(None))) => Step::Absent,
    }
}

fn unexpected(request_id: &str, detail: &str) -> GenerationOutcome {
    GenerationOutcome::failed(request_id, format!("Unexpected error: {detail}"))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic during processing".to_owned())
}
