use secrecy::SecretString;
use serde::Deserialize;

/// S3 object storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Destination bucket
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Explicit access key; the default AWS credential chain is used when unset
    #[serde(default)]
    pub access_key_id: Option<SecretString>,
    /// Explicit secret key
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
    /// Custom endpoint for S3-compatible stores
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Images wider than this are scaled down
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,
    /// Images taller than this are scaled down
    #[serde(default = "default_max_dimension")]
    pub max_height: u32,
    /// `Cache-Control` header stored with each object
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
    /// Upper bound on processing plus upload
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            cache_control: default_cache_control(),
            timeout: default_timeout(),
        }
    }
}

fn default_bucket() -> String {
    "mobiarty-assets".to_owned()
}

fn default_region() -> String {
    "us-west-2".to_owned()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_dimension() -> u32 {
    1024
}

fn default_cache_control() -> String {
    "max-age=31536000".to_owned()
}

fn default_timeout() -> String {
    "30s".to_owned()
}
