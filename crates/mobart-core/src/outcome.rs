use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Terminal state of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeStatus {
    Completed,
    Failed,
}

/// Result of processing one request, handed to the notifier exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub request_id: String,
    pub status: OutcomeStatus,
    /// Storage key on success, empty otherwise
    pub content_reference: String,
    /// Human-readable cause, only set on failure
    pub error_reason: Option<String>,
    /// Generation plus storage wall-clock time, only set on success
    pub elapsed_seconds: Option<f64>,
}

impl GenerationOutcome {
    pub fn completed(request_id: impl Into<String>, storage_key: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            request_id: request_id.into(),
            status: OutcomeStatus::Completed,
            content_reference: storage_key.into(),
            error_reason: None,
            elapsed_seconds: Some(elapsed.as_secs_f64()),
        }
    }

    pub fn failed(request_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: OutcomeStatus::Failed,
            content_reference: String::new(),
            error_reason: Some(reason.into()),
            elapsed_seconds: None,
        }
    }

    pub const fn is_completed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Completed)
    }
}
