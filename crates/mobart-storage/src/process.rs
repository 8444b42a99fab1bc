use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};

use crate::error::{Result, StorageError};

/// Stylistic transformation applied after resizing
pub trait PostProcessor: Send + Sync {
    fn apply(&self, image: RgbaImage) -> RgbaImage;
}

/// Leaves the image untouched
pub struct Passthrough;

impl PostProcessor for Passthrough {
    fn apply(&self, image: RgbaImage) -> RgbaImage {
        image
    }
}

/// Decode, bound, post-process and re-encode generated images as PNG
#[derive(Clone)]
pub struct ImageProcessor {
    max_width: u32,
    max_height: u32,
    post: Arc<dyn PostProcessor>,
}

impl ImageProcessor {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self::with_post_processor(max_width, max_height, Arc::new(Passthrough))
    }

    pub fn with_post_processor(max_width: u32, max_height: u32, post: Arc<dyn PostProcessor>) -> Self {
        Self {
            max_width,
            max_height,
            post,
        }
    }

    /// Produce the PNG that gets uploaded
    ///
    /// Undecodable input is an error rather than being passed through, so a
    /// corrupt payload never reaches storage.
    pub fn process(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(bytes).map_err(StorageError::Decode)?;
        let (width, height) = decoded.dimensions();

        let bounded = if width > self.max_width || height > self.max_height {
            let resized = decoded.resize(self.max_width, self.max_height, FilterType::Lanczos3);
            tracing::info!(
                from = %format!("{width}x{height}"),
                to = %format!("{}x{}", resized.width(), resized.height()),
                "resized image"
            );
            resized
        } else {
            decoded
        };

        let processed = self.post.apply(bounded.into_rgba8());

        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(processed)
            .write_to(&mut encoded, ImageFormat::Png)
            .map_err(StorageError::Encode)?;

        Ok(encoded.into_inner())
    }
}
