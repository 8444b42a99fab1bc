use futures::{Stream, StreamExt};
use mobart_core::RawRequest;
use tokio_util::sync::CancellationToken;

use crate::pipeline::Pipeline;

/// Feed channel payloads through the pipeline one at a time
///
/// Returns once `cancel` fires or the payload stream ends. A payload that
/// is already being processed always runs to completion; cancellation is
/// only observed between payloads. Payloads that fail to decode are
/// logged and skipped.
pub async fn listen<S>(payloads: S, pipeline: &Pipeline, cancel: CancellationToken)
where
    S: Stream<Item = String>,
{
    let mut payloads = std::pin::pin!(payloads);

    tracing::info!("listening for generation requests");

    loop {
        let payload = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                tracing::info!("stop requested, leaving listen loop");
                break;
            }
            next = payloads.next() => {
                let Some(payload) = next else {
                    tracing::warn!("request channel closed");
                    break;
                };
                payload
            }
        };

        match RawRequest::decode(&payload) {
            Ok(raw) => {
                pipeline.process(raw).await;
            }
            Err(e) => {
                tracing::error!(error = %e, size = payload.len(), "failed to decode request payload");
                pipeline.metrics().record_rejected("decode");
            }
        }
    }
}
