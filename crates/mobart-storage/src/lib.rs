#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod process;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;

pub use error::{Result, StorageError};
pub use process::{ImageProcessor, Passthrough, PostProcessor};
pub use s3::S3ArtifactStore;

/// Durable home for finished artifacts
///
/// `Ok(None)` means nothing was stored: the bytes were not a readable
/// image, or the upload itself was refused or lost. `Err` is reserved for
/// failures outside the normal contract.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Process `image` and persist it under `key`, returning the stored reference
    async fn store(&self, image: Bytes, key: &str) -> Result<Option<String>>;

    /// Startup reachability probe
    async fn test_connection(&self) -> bool;
}
