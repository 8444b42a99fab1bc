use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Failures that prevent an artifact from being produced at all
#[derive(Debug, Error)]
pub enum StorageError {
    /// Input bytes are not a decodable image
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Processed image could not be re-encoded
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Processing task did not finish
    #[error("image processing task failed: {0}")]
    Task(String),
}
