pub(crate) mod leonardo;
pub mod mock;
pub(crate) mod openai;
pub(crate) mod stability;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Capability shared by every image generation backend
///
/// `Ok(None)` means no image came back: a non-success status, a transport
/// failure, a backend-reported failure or a success body that could not be
/// read. `Err` is reserved for failures outside that contract, such as a
/// local encoding fault.
#[async_trait]
pub trait ImageGenProvider: Send + Sync {
    /// Turn a prompt into encoded image bytes
    async fn generate(&self, prompt: &str, request_id: &str) -> Result<Option<Bytes>>;

    /// Startup reachability probe, never called per request
    async fn test_connection(&self) -> bool;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Append the configured style suffix to a prompt
pub fn augment_prompt(prompt: &str, style_suffix: &str) -> String {
    if style_suffix.is_empty() {
        prompt.to_owned()
    } else {
        format!("{prompt}, {style_suffix}")
    }
}
