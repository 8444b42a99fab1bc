use anyhow::bail;
use mobart_imagegen::ImageGenProvider;
use mobart_storage::ArtifactStore;

/// Probe external dependencies before accepting work
///
/// An unreachable channel or store aborts startup. A failing provider probe
/// is only logged, since generation may still succeed later.
pub async fn run_health_checks(
    channel: impl Future<Output = bool>,
    store: &dyn ArtifactStore,
    provider: &dyn ImageGenProvider,
) -> anyhow::Result<()> {
    if !channel.await {
        bail!("request channel is unreachable");
    }
    tracing::info!("request channel reachable");

    if !store.test_connection().await {
        bail!("artifact store is unreachable");
    }
    tracing::info!("artifact store reachable");

    if provider.test_connection().await {
        tracing::info!(provider = provider.name(), "image provider reachable");
    } else {
        tracing::warn!(provider = provider.name(), "image provider connection test failed, continuing");
    }

    Ok(())
}
