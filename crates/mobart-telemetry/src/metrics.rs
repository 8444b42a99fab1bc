//! Metric names and instruments for the request pipeline

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};

pub const REQUEST_COUNT: &str = "mobart.request.count";
pub const REQUEST_DURATION: &str = "mobart.request.duration";
pub const REJECTED_PAYLOAD_COUNT: &str = "mobart.payload.rejected";

/// Instruments recorded once per processed payload
///
/// Without an installed meter provider every recording is a no-op.
#[derive(Clone)]
pub struct PipelineMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
    rejected: Counter<u64>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        let meter = global::meter("mobart");

        Self {
            requests: meter
                .u64_counter(REQUEST_COUNT)
                .with_description("Requests that reached a terminal outcome")
                .build(),
            duration: meter
                .f64_histogram(REQUEST_DURATION)
                .with_description("Generation plus storage time of completed requests")
                .with_unit("s")
                .build(),
            rejected: meter
                .u64_counter(REJECTED_PAYLOAD_COUNT)
                .with_description("Payloads dropped before processing")
                .build(),
        }
    }

    /// Count a terminal outcome
    pub fn record_outcome(&self, status: &str, provider: &str) {
        self.requests.add(
            1,
            &[
                KeyValue::new("status", status.to_owned()),
                KeyValue::new("provider", provider.to_owned()),
            ],
        );
    }

    /// Record the duration of a completed request
    pub fn record_duration(&self, elapsed: Duration, provider: &str) {
        self.duration
            .record(elapsed.as_secs_f64(), &[KeyValue::new("provider", provider.to_owned())]);
    }

    /// Count a payload dropped for `reason` (`decode` or `invalid`)
    pub fn record_rejected(&self, reason: &'static str) {
        self.rejected.add(1, &[KeyValue::new("reason", reason)]);
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
