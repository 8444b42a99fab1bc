#![allow(dead_code)]

pub mod backend;
pub mod config;

use std::sync::Arc;

use futures::stream;
use mobart_config::{Config, parse_duration};
use mobart_storage::{ArtifactStore, S3ArtifactStore};
use mobart_worker::{Pipeline, Timeouts, listen};
use tokio_util::sync::CancellationToken;

/// Wire a pipeline from configuration the same way the worker does
pub async fn pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let provider = mobart_imagegen::build_provider(&config.provider)?;
    let store: Arc<dyn ArtifactStore> = Arc::new(S3ArtifactStore::new(&config.storage).await);
    let notifier = mobart_notifier::build_notifier(&config.notifier, &config.channel).await?;

    Ok(Pipeline::new(provider, store, notifier).with_timeouts(Timeouts {
        generation: parse_duration(&config.provider.timeout)?,
        storage: parse_duration(&config.storage.timeout)?,
    }))
}

/// Feed raw channel payloads through a pipeline until they run out
pub async fn deliver(pipeline: &Pipeline, payloads: &[&str]) {
    let payloads: Vec<String> = payloads.iter().map(|p| (*p).to_owned()).collect();
    listen(stream::iter(payloads), pipeline, CancellationToken::new()).await;
}

/// A well-formed request payload
pub fn request(request_id: &str, user_id: &str, prompt: &str) -> String {
    serde_json::json!({
        "request_id": request_id,
        "user_id": user_id,
        "prompt": prompt,
    })
    .to_string()
}
