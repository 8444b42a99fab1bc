use std::time::Duration;

use async_trait::async_trait;
use mobart_core::GenerationOutcome;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::OutcomeNotifier;
use crate::error::NotifyError;
use crate::payload::CompletionEvent;

/// Publishes completion events on a redis channel
#[derive(Clone)]
pub struct RedisNotifier {
    connection: ConnectionManager,
    channel: String,
    timeout: Duration,
}

impl RedisNotifier {
    /// Connect to redis and prepare to publish on `channel`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the connection cannot be established
    pub async fn connect(url: &str, channel: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = redis::Client::open(url)?;
        let connection = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| NotifyError::Timeout(timeout))??;

        Ok(Self {
            connection,
            channel,
            timeout,
        })
    }
}

#[async_trait]
impl OutcomeNotifier for RedisNotifier {
    async fn notify(&self, outcome: &GenerationOutcome) -> Result<(), NotifyError> {
        let event = serde_json::to_string(&CompletionEvent::new(outcome, jiff::Timestamp::now()))?;
        let mut connection = self.connection.clone();

        let receivers: i64 = tokio::time::timeout(self.timeout, connection.publish(&self.channel, &event))
            .await
            .map_err(|_| NotifyError::Timeout(self.timeout))??;

        tracing::info!(
            request_id = %outcome.request_id,
            channel = %self.channel,
            receivers,
            "published completion"
        );

        Ok(())
    }

    fn name(&self) -> &str {
        "redis"
    }
}
