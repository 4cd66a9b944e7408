//! S3-backed media store.
//!
//! Works against AWS S3 and S3-compatible services (MinIO, R2, Spaces) when
//! `S3_ENDPOINT` is set. Objects are served from `MEDIA_PUBLIC_BASE_URL`,
//! typically a CDN or the bucket's public endpoint.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::{MediaStore, StorageError, StoredObject};

/// S3 connection settings.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services. Enables path-style addressing.
    pub endpoint: Option<String>,
    /// Static credentials; when absent the default AWS provider chain is used.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub public_base_url: String,
}

impl S3Config {
    /// Load S3 configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default                                   |
    /// |-------------------------|----------|-------------------------------------------|
    /// | `S3_BUCKET`             | **yes**  | --                                        |
    /// | `S3_REGION`             | no       | `us-east-1`                               |
    /// | `S3_ENDPOINT`           | no       | --                                        |
    /// | `S3_ACCESS_KEY_ID`      | no       | --                                        |
    /// | `S3_SECRET_ACCESS_KEY`  | no       | --                                        |
    /// | `MEDIA_PUBLIC_BASE_URL` | no       | `https://{bucket}.s3.{region}.amazonaws.com` |
    ///
    /// # Panics
    ///
    /// Panics if `S3_BUCKET` is not set or is empty.
    pub fn from_env() -> Self {
        let bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set in the environment");
        assert!(!bucket.is_empty(), "S3_BUCKET must not be empty");

        let region = std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into());
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let public_base_url = non_empty("MEDIA_PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("https://{bucket}.s3.{region}.amazonaws.com"));

        Self {
            endpoint: non_empty("S3_ENDPOINT"),
            access_key_id: non_empty("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty("S3_SECRET_ACCESS_KEY"),
            bucket,
            region,
            public_base_url,
        }
    }
}

pub struct S3MediaStore {
    client: Client,
    config: S3Config,
}

impl S3MediaStore {
    /// Build the S3 client from configuration.
    pub async fn new(config: S3Config) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "castlane-env",
            ));
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            config,
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::debug!(key, size, "Uploaded object to S3");
        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::debug!(key, "Deleted object from S3");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    fn public_base_url(&self) -> &str {
        &self.config.public_base_url
    }
}
