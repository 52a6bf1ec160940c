//! Upload gateways
//!
//! Both gateways share one put-then-sign primitive, [`ObjectPublisher`]. They
//! differ only in how the key is derived and whether the URL host is rewritten.

use crate::config::StorageConfig;
use crate::keys::{extension_of, flat_key, record_key};
use crate::rewrite::{strip_query, EndpointRewriter};
use crate::storage::{StorageClient, StorageResult};
use crate::{Result, StorageError};
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// An upload as received from the HTTP layer
#[derive(Clone, Debug, Default)]
pub struct UploadRequest {
    /// Uploader identifier (first virtual folder)
    pub owner_id: Option<String>,
    /// Record category (second virtual folder); absent for generic uploads
    pub category: Option<String>,
    /// Original file name
    pub file_name: Option<String>,
    /// File bytes
    pub content: Bytes,
}

impl UploadRequest {
    /// Extension of the original file name, empty when unknown
    pub fn extension(&self) -> &str {
        extension_of(self.file_name.as_deref())
    }
}

/// Stores an object, signs a download URL for it and prepares it for the caller
#[derive(Clone)]
pub struct ObjectPublisher {
    storage: Arc<dyn StorageClient>,
    presign_ttl: Duration,
    operation_timeout: Duration,
}

impl ObjectPublisher {
    /// Create a publisher over a shared storage client
    pub fn new(storage: Arc<dyn StorageClient>, presign_ttl: Duration, operation_timeout: Duration) -> Self {
        Self {
            storage,
            presign_ttl,
            operation_timeout,
        }
    }

    /// Create a publisher using the TTL and timeout from `config`
    pub fn from_config(storage: Arc<dyn StorageClient>, config: &StorageConfig) -> Self {
        Self::new(storage, config.presign_ttl, config.operation_timeout)
    }

    /// The underlying storage client
    pub fn storage(&self) -> &Arc<dyn StorageClient> {
        &self.storage
    }

    /// Put `content` at `(bucket, key)`, then return its download URL.
    ///
    /// With a rewriter the host is swapped for the public endpoint. The query
    /// string is dropped either way. A failed put never reaches the signing step.
    pub async fn put_and_sign(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
        rewriter: Option<&EndpointRewriter>,
    ) -> StorageResult<String> {
        let size = content.len();
        self.bounded(self.storage.put(bucket, key, content)).await?;
        debug!(bucket, key, size, backend = self.storage.backend_name(), "Object stored");

        let signed = self
            .bounded(self.storage.presigned_get_url(bucket, key, self.presign_ttl))
            .await?;

        Ok(match rewriter {
            Some(rewriter) => rewriter.rewrite(&signed),
            None => strip_query(&signed).to_string(),
        })
    }

    async fn bounded<T>(&self, fut: impl Future<Output = StorageResult<T>>) -> StorageResult<T> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::BackendTimeout {
                seconds: self.operation_timeout.as_secs(),
            }),
        }
    }
}

/// Generic uploads into a flat namespace. The caller's file name is the key.
#[derive(Clone)]
pub struct UploadGateway {
    publisher: ObjectPublisher,
    bucket: String,
}

impl UploadGateway {
    /// Create a gateway writing into `bucket`
    pub fn new(publisher: ObjectPublisher, bucket: impl Into<String>) -> Self {
        Self {
            publisher,
            bucket: bucket.into(),
        }
    }

    /// Target bucket
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Store `content` under `file_name` and return its URL without query parameters.
    ///
    /// Uploading the same name again overwrites the earlier object.
    #[instrument(skip(self, content), fields(bucket = %self.bucket, size = content.len()))]
    pub async fn upload(&self, file_name: &str, content: Bytes) -> Result<String> {
        let key = flat_key(file_name)?;
        let url = self
            .publisher
            .put_and_sign(&self.bucket, &key, content, None)
            .await
            .map_err(|e| {
                warn!(error = %e, key = %key, "Upload failed");
                e
            })?;
        info!(key = %key, "Upload complete");
        Ok(url)
    }
}

/// Categorized uploads under `owner/category/` virtual folders
#[derive(Clone)]
pub struct RecordUploadGateway {
    publisher: ObjectPublisher,
    bucket: String,
    rewriter: EndpointRewriter,
}

impl RecordUploadGateway {
    /// Create a gateway writing into `bucket` and returning URLs on the rewriter's public base
    pub fn new(publisher: ObjectPublisher, bucket: impl Into<String>, rewriter: EndpointRewriter) -> Self {
        Self {
            publisher,
            bucket: bucket.into(),
            rewriter,
        }
    }

    /// Target bucket
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Store a record file and return its public URL.
    ///
    /// Rejects unsafe identifiers before contacting the store.
    #[instrument(skip(self, content), fields(bucket = %self.bucket, size = content.len()))]
    pub async fn upload(
        &self,
        owner_id: &str,
        category: &str,
        timestamp: &str,
        extension: &str,
        content: Bytes,
    ) -> Result<String> {
        let key = record_key(owner_id, category, timestamp, extension)?;
        let url = self
            .publisher
            .put_and_sign(&self.bucket, &key, content, Some(&self.rewriter))
            .await
            .map_err(|e| {
                warn!(error = %e, key = %key, "Record upload failed");
                e
            })?;
        info!(key = %key, "Record upload complete");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorageClient, MockStorageClient};
    use crate::GatewayError;

    const INTERNAL: &str = "http://minio:9000";
    const PUBLIC: &str = "https://files.example.com";
    const TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    fn memory() -> Arc<MemoryStorageClient> {
        Arc::new(MemoryStorageClient::with_buckets(
            INTERNAL,
            ["urticaria-data", "medical-record"],
        ))
    }

    fn publisher(storage: Arc<dyn StorageClient>) -> ObjectPublisher {
        ObjectPublisher::new(storage, TTL, Duration::from_secs(5))
    }

    fn record_gateway(storage: Arc<dyn StorageClient>) -> RecordUploadGateway {
        RecordUploadGateway::new(
            publisher(storage),
            "medical-record",
            EndpointRewriter::new(INTERNAL, PUBLIC),
        )
    }

    #[tokio::test]
    async fn test_record_upload_scenario() {
        let store = memory();
        let gateway = record_gateway(store.clone());

        let url = gateway
            .upload("u1", "xray", "20240101", "png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();

        assert!(url.starts_with(
            "https://files.example.com/medical-record/u1/xray/u1-xray-20240101.png"
        ));
        assert!(!url.contains('?'));
        assert_eq!(store.list_keys("medical-record"), vec!["u1/xray/u1-xray-20240101.png"]);
    }

    #[tokio::test]
    async fn test_record_upload_round_trip_empty_content() {
        let store = memory();
        let gateway = record_gateway(store.clone());

        gateway
            .upload("u1", "notes", "1", "", Bytes::new())
            .await
            .unwrap();

        let data = store.get("medical-record", "u1/notes/u1-notes-1").await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_record_upload_same_arguments_overwrite() {
        let store = memory();
        let gateway = record_gateway(store.clone());

        let first = gateway
            .upload("u1", "xray", "7", "png", Bytes::from_static(b"first"))
            .await
            .unwrap();
        let second = gateway
            .upload("u1", "xray", "7", "png", Bytes::from_static(b"second"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        let data = store.get("medical-record", "u1/xray/u1-xray-7.png").await.unwrap();
        assert_eq!(data.as_ref(), b"second");
    }

    #[tokio::test]
    async fn test_record_upload_rejects_traversal_before_storage() {
        let mut mock = MockStorageClient::new();
        mock.expect_put().never();
        mock.expect_presigned_get_url().never();
        let gateway = record_gateway(Arc::new(mock));

        let err = gateway
            .upload("../admin", "xray", "1", "png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_generic_upload_rejects_names_the_backend_would_rewrite() {
        let mut mock = MockStorageClient::new();
        mock.expect_put().never();
        mock.expect_presigned_get_url().never();
        let gateway = UploadGateway::new(publisher(Arc::new(mock)), "urticaria-data");

        for name in ["/lead.png", "dir/", "a//b.png", "a/./b.png"] {
            let err = gateway
                .upload(name, Bytes::from_static(b"x"))
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::InvalidArgument(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn test_generic_upload_strips_query_keeps_host() {
        let store = memory();
        let gateway = UploadGateway::new(publisher(store.clone()), "urticaria-data");

        let url = gateway
            .upload("scan.png", Bytes::from_static(b"one"))
            .await
            .unwrap();
        assert_eq!(url, "http://minio:9000/urticaria-data/scan.png");
    }

    #[tokio::test]
    async fn test_generic_upload_overwrites_same_name() {
        let store = memory();
        let gateway = UploadGateway::new(publisher(store.clone()), "urticaria-data");

        gateway.upload("scan.png", Bytes::from_static(b"one")).await.unwrap();
        gateway.upload("scan.png", Bytes::from_static(b"two")).await.unwrap();

        let data = store.get("urticaria-data", "scan.png").await.unwrap();
        assert_eq!(data.as_ref(), b"two");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_put_failure_skips_presign() {
        let mut mock = MockStorageClient::new();
        mock.expect_put()
            .times(1)
            .returning(|_, _, _| Err(StorageError::PermissionDenied("denied".to_string())));
        mock.expect_presigned_get_url().never();
        mock.expect_backend_name().return_const("mock");
        let gateway = UploadGateway::new(publisher(Arc::new(mock)), "urticaria-data");

        let err = gateway
            .upload("scan.png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Storage(StorageError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_bucket_is_storage_error() {
        let store = Arc::new(MemoryStorageClient::new(INTERNAL));
        let gateway = UploadGateway::new(publisher(store), "urticaria-data");

        let err = gateway
            .upload("scan.png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Storage(StorageError::BucketNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_presign_uses_configured_ttl() {
        let mut mock = MockStorageClient::new();
        mock.expect_put().returning(|_, _, _| Ok(()));
        mock.expect_backend_name().return_const("mock");
        mock.expect_presigned_get_url()
            .withf(|bucket, key, ttl| {
                bucket == "medical-record" && key == "u1/lab/u1-lab-9.pdf" && *ttl == TTL
            })
            .times(1)
            .returning(|_, _, _| {
                Ok("http://minio:9000/medical-record/u1/lab/u1-lab-9.pdf?X-Amz-Signature=1".to_string())
            });
        let gateway = record_gateway(Arc::new(mock));

        let url = gateway
            .upload("u1", "lab", "9", "pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        assert_eq!(url, "https://files.example.com/medical-record/u1/lab/u1-lab-9.pdf");
    }

    struct SlowStorage;

    #[async_trait::async_trait]
    impl StorageClient for SlowStorage {
        async fn put(&self, _bucket: &str, _key: &str, _content: Bytes) -> StorageResult<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }

        async fn presigned_get_url(&self, _: &str, _: &str, _: Duration) -> StorageResult<String> {
            Ok(String::new())
        }

        async fn get(&self, _: &str, _: &str) -> StorageResult<Bytes> {
            Ok(Bytes::new())
        }

        fn backend_name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let publisher = ObjectPublisher::new(Arc::new(SlowStorage), TTL, Duration::from_millis(50));

        let err = publisher
            .put_and_sign("b", "k", Bytes::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BackendTimeout { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_upload_request_extension() {
        let request = UploadRequest {
            file_name: Some("rash.jpeg".to_string()),
            ..Default::default()
        };
        assert_eq!(request.extension(), "jpeg");
        assert_eq!(UploadRequest::default().extension(), "");
    }
}
