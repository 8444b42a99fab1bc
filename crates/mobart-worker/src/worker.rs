use std::sync::Arc;

use anyhow::Context;
use mobart_config::{Config, parse_duration};
use mobart_imagegen::{ImageGenProvider, build_provider};
use mobart_notifier::build_notifier;
use mobart_storage::{ArtifactStore, S3ArtifactStore};
use tokio_util::sync::CancellationToken;

use crate::channel::RedisChannel;
use crate::health::run_health_checks;
use crate::listener::listen;
use crate::pipeline::{Pipeline, Timeouts};

/// A fully wired worker: channel, pipeline and its collaborators
pub struct Worker {
    channel: RedisChannel,
    provider: Arc<dyn ImageGenProvider>,
    store: Arc<dyn ArtifactStore>,
    pipeline: Pipeline,
}

impl Worker {
    /// Construct every component from configuration
    ///
    /// Nothing is probed here; see [`Worker::run`].
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let channel = RedisChannel::new(&config.channel).context("invalid request channel URL")?;
        let provider = build_provider(&config.provider).context("failed to build image provider")?;
        let store: Arc<dyn ArtifactStore> = Arc::new(S3ArtifactStore::new(&config.storage).await);
        let notifier = build_notifier(&config.notifier, &config.channel)
            .await
            .context("failed to build notifier")?;

        let timeouts = Timeouts {
            generation: parse_duration(&config.provider.timeout)?,
            storage: parse_duration(&config.storage.timeout)?,
        };

        tracing::info!(
            channel = channel.name(),
            provider = provider.name(),
            bucket = %config.storage.bucket,
            notifier = notifier.name(),
            "worker configured"
        );

        let pipeline = Pipeline::new(provider.clone(), store.clone(), notifier).with_timeouts(timeouts);

        Ok(Self {
            channel,
            provider,
            store,
            pipeline,
        })
    }

    /// Probe dependencies, subscribe, and process requests until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) -> anyhow::Result<()> {
        run_health_checks(self.channel.health_check(), self.store.as_ref(), self.provider.as_ref()).await?;

        let payloads = self
            .channel
            .subscribe()
            .await
            .context("failed to subscribe to request channel")?;

        listen(payloads, &self.pipeline, cancel).await;

        tracing::info!("worker stopped");

        Ok(())
    }
}
