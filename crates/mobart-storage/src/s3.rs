use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use mobart_config::StorageConfig;
use secrecy::ExposeSecret;

use crate::ArtifactStore;
use crate::error::{Result, StorageError};
use crate::process::ImageProcessor;

/// Artifact store backed by an S3 bucket
pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
    cache_control: String,
    processor: ImageProcessor,
}

impl S3ArtifactStore {
    /// Create a store from configuration
    ///
    /// Uses explicit credentials when configured, otherwise the default
    /// AWS credential chain.
    pub async fn new(config: &StorageConfig) -> Self {
        let client = build_client(config).await;

        Self::with_client(
            client,
            config.bucket.clone(),
            config.cache_control.clone(),
            ImageProcessor::new(config.max_width, config.max_height),
        )
    }

    pub fn with_client(client: Client, bucket: String, cache_control: String, processor: ImageProcessor) -> Self {
        Self {
            client,
            bucket,
            cache_control,
            processor,
        }
    }
}

/// Build an S3 client from configuration
async fn build_client(config: &StorageConfig) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let (Some(access_key), Some(secret_key)) = (&config.access_key_id, &config.secret_access_key) {
        let credentials = aws_credential_types::Credentials::new(
            access_key.expose_secret(),
            secret_key.expose_secret(),
            None,
            None,
            "mobart-config",
        );
        loader = loader.credentials_provider(credentials);
    }

    if let Some(ref endpoint) = config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;

    // S3-compatible endpoints generally do not resolve virtual-hosted buckets
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    Client::from_conf(s3_config)
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn store(&self, image: Bytes, key: &str) -> Result<Option<String>> {
        tracing::info!(key, size = image.len(), "processing image for upload");

        let processor = self.processor.clone();
        let processed = tokio::task::spawn_blocking(move || processor.process(&image))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))
            .and_then(|result| result);

        let png = match processed {
            Ok(png) => png,
            Err(e) => {
                tracing::error!(key, error = %e, "image processing failed, nothing uploaded");
                return Ok(None);
            }
        };

        tracing::info!(bucket = %self.bucket, key, size = png.len(), "uploading to S3");

        let upload = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(png))
            .content_type("image/png")
            .cache_control(&self.cache_control)
            .send()
            .await;

        match upload {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, key, "upload complete");
                Ok(Some(key.to_owned()))
            }
            Err(e) => {
                tracing::error!(bucket = %self.bucket, key, error = %DisplayErrorContext(&e), "S3 upload failed");
                Ok(None)
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(bucket = %self.bucket, error = %DisplayErrorContext(&e), "S3 connection test failed");
                false
            }
        }
    }
}
