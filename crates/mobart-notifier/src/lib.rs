#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod completion;
pub mod error;
pub mod http;
pub mod payload;

use std::sync::Arc;

use async_trait::async_trait;
use mobart_config::{ChannelConfig, NotifierConfig, parse_duration};
use mobart_core::GenerationOutcome;

pub use completion::RedisNotifier;
pub use error::NotifyError;
pub use http::HttpNotifier;

/// Reports a terminal outcome to the system of record
///
/// Delivery is best effort: callers log failures and move on.
#[async_trait]
pub trait OutcomeNotifier: Send + Sync {
    async fn notify(&self, outcome: &GenerationOutcome) -> Result<(), NotifyError>;

    fn name(&self) -> &str;
}

/// Delivers each outcome to every member
pub struct NotifierSet {
    members: Vec<Arc<dyn OutcomeNotifier>>,
}

impl NotifierSet {
    pub fn new(members: Vec<Arc<dyn OutcomeNotifier>>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl OutcomeNotifier for NotifierSet {
    async fn notify(&self, outcome: &GenerationOutcome) -> Result<(), NotifyError> {
        let mut failed = 0;

        for member in &self.members {
            if let Err(e) = member.notify(outcome).await {
                tracing::error!(
                    notifier = member.name(),
                    request_id = %outcome.request_id,
                    error = %e,
                    "notification failed"
                );
                failed += 1;
            }
        }

        if failed == 0 {
            Ok(())
        } else {
            Err(NotifyError::Fanout {
                failed,
                total: self.members.len(),
            })
        }
    }

    fn name(&self) -> &str {
        "fanout"
    }
}

/// Build the configured notifier
///
/// A single configured target is returned as-is; several are wrapped in a
/// [`NotifierSet`].
pub async fn build_notifier(
    config: &NotifierConfig,
    channel: &ChannelConfig,
) -> Result<Arc<dyn OutcomeNotifier>, NotifyError> {
    let mut members: Vec<Arc<dyn OutcomeNotifier>> = Vec::new();

    if let Some(ref http) = config.http {
        let timeout = parse_duration(&http.timeout).map_err(|e| NotifyError::Config(e.to_string()))?;
        members.push(Arc::new(HttpNotifier::new(&http.base_url, &http.path, timeout)?));
        tracing::debug!(base_url = %http.base_url, "http notifier configured");
    }

    if let Some(ref redis) = config.redis {
        let timeout = parse_duration(&redis.timeout).map_err(|e| NotifyError::Config(e.to_string()))?;
        members.push(Arc::new(
            RedisNotifier::connect(&channel.url, channel.completion_channel.clone(), timeout).await?,
        ));
        tracing::debug!(channel = %channel.completion_channel, "redis notifier configured");
    }

    match members.len() {
        0 => Err(NotifyError::Config("no notifier configured".to_owned())),
        1 => Ok(members.remove(0)),
        _ => Ok(Arc::new(NotifierSet::new(members))),
    }
}
