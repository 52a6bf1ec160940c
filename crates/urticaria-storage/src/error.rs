//! Error types for the urticaria-storage crate

use thiserror::Error;

/// Result type alias using `GatewayError`
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by the upload gateways
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Caller supplied an unusable identifier or file name
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing object store rejected or failed the request
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Missing or malformed endpoint/credential settings
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Create an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether the caller can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Errors reported by a [`crate::StorageClient`] backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// Target bucket does not exist
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Object does not exist
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// Credentials were rejected
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Backend could not be reached
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Backend did not answer in time
    #[error("backend timed out after {seconds}s")]
    BackendTimeout { seconds: u64 },

    /// Any other backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Transient failures a caller may choose to retry. Nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable(_) | Self::BackendTimeout { .. }
        )
    }
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::PermissionDenied { path, .. }
            | object_store::Error::Unauthenticated { path, .. } => {
                StorageError::PermissionDenied(path)
            }
            object_store::Error::NotFound { path, .. } => StorageError::Backend(format!(
                "not found: {path}"
            )),
            other => {
                let message = other.to_string();
                if message.contains("NoSuchBucket") {
                    StorageError::BucketNotFound(message)
                } else if message.contains("AccessDenied") {
                    StorageError::PermissionDenied(message)
                } else if message.contains("error sending request")
                    || message.contains("onnection refused")
                    || message.contains("dns error")
                {
                    StorageError::NetworkUnavailable(message)
                } else if message.contains("timed out") {
                    StorageError::BackendTimeout { seconds: 0 }
                } else {
                    StorageError::Backend(message)
                }
            }
        }
    }
}
