//! In-memory storage backend for development and testing

use super::{StorageClient, StorageResult};
use crate::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// An in-memory object store.
///
/// Buckets must be created up front, mirroring a real store where this
/// service never creates buckets itself. Presigned URLs are shaped like
/// path-style S3 URLs under `endpoint`, with a keyed BLAKE3 tag standing in
/// for the SigV4 signature.
#[derive(Clone)]
pub struct MemoryStorageClient {
    endpoint: String,
    signing_key: [u8; 32],
    buckets: Arc<DashSet<String>>,
    objects: Arc<DashMap<(String, String), Bytes>>,
}

impl MemoryStorageClient {
    /// Create an empty store that signs URLs under `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let signing_key = blake3::derive_key("urticaria-storage memory presign", endpoint.as_bytes());
        Self {
            endpoint,
            signing_key,
            buckets: Arc::new(DashSet::new()),
            objects: Arc::new(DashMap::new()),
        }
    }

    /// Create a store with the given buckets already present
    pub fn with_buckets<I, S>(endpoint: impl Into<String>, buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new(endpoint);
        for bucket in buckets {
            store.create_bucket(bucket);
        }
        store
    }

    /// Add a bucket
    pub fn create_bucket(&self, bucket: impl Into<String>) {
        self.buckets.insert(bucket.into());
    }

    /// Number of stored objects across all buckets
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Keys stored in a bucket, sorted
    pub fn list_keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().0 == bucket)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    fn require_bucket(&self, bucket: &str) -> StorageResult<()> {
        if self.buckets.contains(bucket) {
            Ok(())
        } else {
            Err(StorageError::BucketNotFound(bucket.to_string()))
        }
    }

    fn signature(&self, bucket: &str, key: &str, expires_at: u64) -> String {
        let mut hasher = blake3::Hasher::new_keyed(&self.signing_key);
        hasher.update(bucket.as_bytes());
        hasher.update(b"/");
        hasher.update(key.as_bytes());
        hasher.update(&expires_at.to_be_bytes());
        hex::encode(hasher.finalize().as_bytes())
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    async fn put(&self, bucket: &str, key: &str, content: Bytes) -> StorageResult<()> {
        self.require_bucket(bucket)?;
        self.objects
            .insert((bucket.to_string(), key.to_string()), content);
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        self.require_bucket(bucket)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let expires_at = now.as_secs() + ttl.as_secs();
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        Ok(format!(
            "{}/{}/{}?X-Amz-Expires={}&X-Amz-Date={}&X-Amz-Signature={}",
            self.endpoint,
            bucket,
            encoded_key,
            ttl.as_secs(),
            now.as_secs(),
            self.signature(bucket, key, expires_at),
        ))
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.require_bucket(bucket)?;
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
