use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};

use super::ImageGenProvider;
use crate::error::Result;

/// Side length of the placeholder image
const MOCK_SIZE: u32 = 512;

/// Light blue
const MOCK_COLOR: Rgb<u8> = Rgb([173, 216, 230]);

/// Deterministic provider for running the pipeline without network access
///
/// Always answers with the same solid-colour PNG.
pub struct MockImageGenProvider {
    image: Bytes,
    delay: Duration,
}

impl MockImageGenProvider {
    /// Create a mock provider that answers after `delay`
    pub fn new(delay: Duration) -> Result<Self> {
        let placeholder = RgbImage::from_pixel(MOCK_SIZE, MOCK_SIZE, MOCK_COLOR);
        let mut encoded = Cursor::new(Vec::new());
        placeholder.write_to(&mut encoded, ImageFormat::Png)?;

        Ok(Self {
            image: Bytes::from(encoded.into_inner()),
            delay,
        })
    }
}

#[async_trait]
impl ImageGenProvider for MockImageGenProvider {
    async fn generate(&self, prompt: &str, request_id: &str) -> Result<Option<Bytes>> {
        tracing::info!(provider = "mock", request_id, prompt, "generating placeholder image");

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(Some(self.image.clone()))
    }

    async fn test_connection(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }
}
