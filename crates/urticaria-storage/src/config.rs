//! Storage configuration

use crate::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default bucket for generic uploads
pub const DEFAULT_UPLOAD_BUCKET: &str = "urticaria-data";

/// Default bucket for categorized medical record uploads
pub const DEFAULT_RECORD_BUCKET: &str = "medical-record";

/// Lifetime of presigned download URLs (7 days)
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Longest expiry SigV4 accepts for a query-signed URL
pub const MAX_PRESIGN_TTL: Duration = DEFAULT_PRESIGN_TTL;

/// Bound applied to every backend call
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Object storage settings, supplied once at process start
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Endpoint the gateway uses to reach the store (e.g. `http://minio:9000`)
    pub internal_endpoint: String,
    /// Endpoint clients use to download objects
    pub public_endpoint: String,
    /// Access key id
    pub access_key: String,
    /// Secret access key
    #[serde(skip_serializing)]
    pub secret_key: String,
    /// Signing region
    pub region: String,
    /// Bucket for generic uploads
    pub upload_bucket: String,
    /// Bucket for medical record uploads
    pub record_bucket: String,
    /// Presigned URL lifetime
    pub presign_ttl: Duration,
    /// Timeout for each put / presign call
    pub operation_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            internal_endpoint: "http://localhost:9000".to_string(),
            public_endpoint: "http://localhost:9000".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            region: "us-east-1".to_string(),
            upload_bucket: DEFAULT_UPLOAD_BUCKET.to_string(),
            record_bucket: DEFAULT_RECORD_BUCKET.to_string(),
            presign_ttl: DEFAULT_PRESIGN_TTL,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl StorageConfig {
    /// Check endpoints, credentials and limits. Any failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        self.validate_endpoints()?;

        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(GatewayError::Configuration(
                "access key and secret must both be set".to_string(),
            ));
        }
        if self.region.is_empty() {
            return Err(GatewayError::Configuration("region must not be empty".to_string()));
        }
        if self.upload_bucket.is_empty() || self.record_bucket.is_empty() {
            return Err(GatewayError::Configuration(
                "bucket names must not be empty".to_string(),
            ));
        }
        if self.presign_ttl.is_zero() || self.presign_ttl > MAX_PRESIGN_TTL {
            return Err(GatewayError::Configuration(format!(
                "presign ttl must be between 1s and {}s",
                MAX_PRESIGN_TTL.as_secs()
            )));
        }
        if self.operation_timeout.is_zero() {
            return Err(GatewayError::Configuration(
                "operation timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Check only the internal and public endpoints.
    ///
    /// Enough for the in-memory backend, which needs no credentials but still
    /// builds and rewrites URLs from both endpoints.
    pub fn validate_endpoints(&self) -> Result<()> {
        validate_endpoint("internal endpoint", &self.internal_endpoint)?;
        validate_endpoint("public endpoint", &self.public_endpoint)
    }
}

fn validate_endpoint(label: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| GatewayError::Configuration(format!("{label} {endpoint:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::Configuration(format!(
            "{label} must use http or https: {endpoint}"
        )));
    }
    if url.host_str().is_none() {
        return Err(GatewayError::Configuration(format!("{label} has no host: {endpoint}")));
    }
    if url.query().is_some() {
        return Err(GatewayError::Configuration(format!(
            "{label} must not carry a query string: {endpoint}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> StorageConfig {
        StorageConfig {
            internal_endpoint: "http://minio:9000".to_string(),
            public_endpoint: "https://files.example.com".to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.upload_bucket, "urticaria-data");
        assert_eq!(config.record_bucket, "medical-record");
        assert_eq!(config.presign_ttl, Duration::from_secs(604_800));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        valid().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_endpoints() {
        let mut config = valid();
        config.internal_endpoint = "minio:9000".to_string();
        assert!(matches!(config.validate(), Err(GatewayError::Configuration(_))));

        let mut config = valid();
        config.public_endpoint = "ftp://files.example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.public_endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_endpoints_ignores_credentials() {
        let mut config = valid();
        config.access_key.clear();
        config.secret_key.clear();
        config.validate_endpoints().unwrap();

        config.public_endpoint = "files.example.com".to_string();
        assert!(matches!(
            config.validate_endpoints(),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let mut config = valid();
        config.access_key.clear();
        assert!(matches!(config.validate(), Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn test_validate_caps_presign_ttl() {
        let mut config = valid();
        config.presign_ttl = Duration::from_secs(8 * 24 * 60 * 60);
        assert!(config.validate().is_err());

        config.presign_ttl = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
