//! Storage backends
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       UploadGateway / RecordGateway     │
//! ├─────────────────────────────────────────┤
//! │           StorageClient Trait           │
//! ├────────────────────┬────────────────────┤
//! │  S3StorageClient   │ MemoryStorageClient│
//! ├────────────────────┴────────────────────┤
//! │        MinIO / any S3-compatible        │
//! └─────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod s3;

pub use memory::MemoryStorageClient;
pub use s3::S3StorageClient;

use crate::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Result type for backend operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Capability interface over an S3-compatible object store.
///
/// Implementations must be safe to share between concurrent uploads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Create or overwrite the object at `(bucket, key)`.
    ///
    /// The declared content length is exactly `content.len()`.
    async fn put(&self, bucket: &str, key: &str, content: Bytes) -> StorageResult<()>;

    /// Produce a GET URL that is valid without further credentials until `ttl` elapses
    async fn presigned_get_url(&self, bucket: &str, key: &str, ttl: Duration)
        -> StorageResult<String>;

    /// Read an object back
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Human readable backend name for logs
    fn backend_name(&self) -> &'static str;
}
