use std::time::Duration;

use futures::{Stream, StreamExt, future};
use mobart_config::ChannelConfig;
use redis::RedisResult;

/// Upper bound on the startup connect and PING round trip
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis pub/sub channel carrying generation requests
pub struct RedisChannel {
    client: redis::Client,
    channel: String,
    health_timeout: Duration,
}

impl RedisChannel {
    /// Prepare a subscriber for the configured request channel
    ///
    /// No connection is made until [`subscribe`](Self::subscribe) or
    /// [`health_check`](Self::health_check) is called.
    pub fn new(config: &ChannelConfig) -> RedisResult<Self> {
        Ok(Self {
            client: redis::Client::open(config.url.as_str())?,
            channel: config.request_channel.clone(),
            health_timeout: HEALTH_TIMEOUT,
        })
    }

    #[must_use]
    pub const fn with_health_timeout(mut self, health_timeout: Duration) -> Self {
        self.health_timeout = health_timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.channel
    }

    /// Subscribe and yield each message body as text
    ///
    /// Messages whose body is not valid UTF-8 are logged and dropped.
    pub async fn subscribe(&self) -> RedisResult<impl Stream<Item = String> + use<>> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;

        tracing::info!(channel = %self.channel, "subscribed to request channel");

        Ok(pubsub.into_on_message().filter_map(|message| {
            future::ready(
                message
                    .get_payload::<String>()
                    .inspect_err(|e| tracing::error!(error = %e, "dropping unreadable message"))
                    .ok(),
            )
        }))
    }

    /// Round-trip a PING, failing if the server does not answer in time
    pub async fn health_check(&self) -> bool {
        match tokio::time::timeout(self.health_timeout, self.ping()).await {
            Ok(healthy) => healthy,
            Err(_) => {
                tracing::error!(timeout = ?self.health_timeout, "redis health check timed out");
                false
            }
        }
    }

    async fn ping(&self) -> bool {
        let mut connection = match self.client.get_multiplexed_async_connection().await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!(error = %e, "redis connection failed");
                return false;
            }
        };

        match redis::cmd("PING").query_async::<String>(&mut connection).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "redis ping failed");
                false
            }
        }
    }
}
