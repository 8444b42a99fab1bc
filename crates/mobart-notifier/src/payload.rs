use mobart_core::{GenerationOutcome, OutcomeStatus};
use serde::Serialize;

/// Body of the backend status update
///
/// `content_url` carries the storage key, not a resolvable URL. The field
/// name is pinned by the backend consumer.
#[derive(Debug, Serialize)]
pub struct StatusUpdate<'a> {
    pub request_id: &'a str,
    pub status: OutcomeStatus,
    pub content_url: &'a str,
}

impl<'a> From<&'a GenerationOutcome> for StatusUpdate<'a> {
    fn from(outcome: &'a GenerationOutcome) -> Self {
        Self {
            request_id: &outcome.request_id,
            status: outcome.status,
            content_url: &outcome.content_reference,
        }
    }
}

/// Event published on the completion channel
#[derive(Debug, Serialize)]
pub struct CompletionEvent<'a> {
    pub request_id: &'a str,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_time_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    /// RFC 3339
    pub timestamp: String,
}

impl<'a> CompletionEvent<'a> {
    pub fn new(outcome: &'a GenerationOutcome, timestamp: jiff::Timestamp) -> Self {
        Self {
            request_id: &outcome.request_id,
            status: outcome.status,
            s3_key: Some(outcome.content_reference.as_str()).filter(|key| !key.is_empty()),
            generation_time_seconds: outcome.elapsed_seconds,
            error: outcome.error_reason.as_deref(),
            timestamp: timestamp.to_string(),
        }
    }
}
