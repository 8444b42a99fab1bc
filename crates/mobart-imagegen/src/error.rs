use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Image generation errors that are not a plain "no image" answer
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// Provider could not be constructed from configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Local image encoding failed
    #[error("image encoding failed: {0}")]
    Encoding(#[from] image::ImageError),
}
