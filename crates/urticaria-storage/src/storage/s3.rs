//! S3-compatible backend (MinIO, AWS S3, ...)

use super::{StorageClient, StorageResult};
use crate::config::StorageConfig;
use crate::{GatewayError, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use http::Method;
use object_store::{
    aws::{AmazonS3, AmazonS3Builder},
    path::Path,
    signer::Signer,
    Attribute, Attributes, ClientOptions, ObjectStore, PutOptions, PutPayload, RetryConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Storage client talking to an S3-compatible endpoint with static credentials.
///
/// `object_store` binds a client to one bucket, so a client is built lazily
/// per bucket and cached.
pub struct S3StorageClient {
    endpoint: String,
    region: String,
    access_key: String,
    secret_key: String,
    timeout: Duration,
    buckets: DashMap<String, Arc<AmazonS3>>,
}

impl S3StorageClient {
    /// Build a client from validated configuration.
    ///
    /// The configured upload and record buckets are set up eagerly so that
    /// malformed settings fail at startup.
    pub fn new(config: &StorageConfig) -> crate::Result<Self> {
        config.validate()?;
        let client = Self {
            endpoint: config.internal_endpoint.trim_end_matches('/').to_string(),
            region: config.region.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            timeout: config.operation_timeout,
            buckets: DashMap::new(),
        };

        for bucket in [&config.upload_bucket, &config.record_bucket] {
            client
                .bucket(bucket)
                .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        }

        Ok(client)
    }

    /// Internal endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn bucket(&self, name: &str) -> StorageResult<Arc<AmazonS3>> {
        if let Some(store) = self.buckets.get(name) {
            return Ok(Arc::clone(store.value()));
        }

        let retry = RetryConfig {
            max_retries: 0,
            ..Default::default()
        };
        let store = AmazonS3Builder::new()
            .with_endpoint(&self.endpoint)
            .with_allow_http(self.endpoint.starts_with("http://"))
            .with_region(&self.region)
            .with_bucket_name(name)
            .with_access_key_id(&self.access_key)
            .with_secret_access_key(&self.secret_key)
            .with_virtual_hosted_style_request(false)
            .with_retry(retry)
            .with_client_options(ClientOptions::new().with_timeout(self.timeout))
            .build()
            .map_err(|e| StorageError::Backend(format!("failed to build S3 client for {name}: {e}")))?;

        let store = Arc::new(store);
        self.buckets.insert(name.to_string(), Arc::clone(&store));
        debug!(bucket = %name, endpoint = %self.endpoint, "Initialized S3 bucket client");
        Ok(store)
    }
}

fn object_path(key: &str) -> StorageResult<Path> {
    Path::parse(key).map_err(|e| StorageError::Backend(format!("invalid object key {key}: {e}")))
}

fn put_options(key: &str) -> PutOptions {
    let mut attributes = Attributes::new();
    if let Some(mime) = mime_guess::from_path(key).first() {
        attributes.insert(Attribute::ContentType, mime.essence_str().to_string().into());
    }
    PutOptions {
        attributes,
        ..Default::default()
    }
}

#[async_trait]
impl StorageClient for S3StorageClient {
    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn put(&self, bucket: &str, key: &str, content: Bytes) -> StorageResult<()> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;

        store
            .put_opts(&path, PutPayload::from(content), put_options(key))
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => {
                    StorageError::BucketNotFound(bucket.to_string())
                }
                other => other.into(),
            })?;

        debug!("Stored object");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;

        let url = store.signed_url(Method::GET, &path, ttl).await?;
        Ok(url.to_string())
    }

    #[instrument(skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;

        let result = store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            other => other.into(),
        })?;
        Ok(result.bytes().await?)
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
