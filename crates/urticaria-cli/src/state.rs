//! Application state

use crate::config::GatewayConfig;
use std::sync::Arc;
use tracing::{info, warn};
use urticaria_storage::{
    EndpointRewriter, MemoryStorageClient, ObjectPublisher, RecordUploadGateway, S3StorageClient,
    StorageClient, UploadGateway,
};

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Storage backend shared by both gateways
    pub storage: Arc<dyn StorageClient>,
    /// Flat uploads
    pub upload_gateway: UploadGateway,
    /// Categorized medical record uploads
    pub record_gateway: RecordUploadGateway,
}

impl AppState {
    /// Create application state, connecting to the configured backend.
    ///
    /// Fails with a configuration error when the S3 settings are unusable.
    /// The in-memory backend only requires valid endpoints.
    pub fn new(config: GatewayConfig) -> urticaria_storage::Result<Self> {
        let storage: Arc<dyn StorageClient> = if config.use_memory_store {
            config.storage.validate_endpoints()?;
            let store = MemoryStorageClient::with_buckets(
                &config.storage.internal_endpoint,
                [
                    config.storage.upload_bucket.clone(),
                    config.storage.record_bucket.clone(),
                ],
            );
            warn!("⚠ Storage mode: In-memory (NOT persistent - for development only)");
            Arc::new(store)
        } else {
            let store = S3StorageClient::new(&config.storage)?;
            info!("✓ Storage mode: S3 at {}", store.endpoint());
            Arc::new(store)
        };

        Ok(Self::with_storage(config, storage))
    }

    /// Create application state over an existing storage client
    pub fn with_storage(config: GatewayConfig, storage: Arc<dyn StorageClient>) -> Self {
        let publisher = ObjectPublisher::from_config(Arc::clone(&storage), &config.storage);
        let rewriter = EndpointRewriter::new(
            &config.storage.internal_endpoint,
            &config.storage.public_endpoint,
        );

        info!(
            internal = %rewriter.internal_base(),
            public = %rewriter.public_base(),
            "Returned URLs have no signature; buckets must allow public reads"
        );

        let upload_gateway = UploadGateway::new(publisher.clone(), &config.storage.upload_bucket);
        let record_gateway =
            RecordUploadGateway::new(publisher, &config.storage.record_bucket, rewriter);

        Self {
            config,
            storage,
            upload_gateway,
            record_gateway,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use urticaria_storage::{GatewayError, StorageConfig};

    fn memory_config(public_endpoint: &str) -> GatewayConfig {
        GatewayConfig {
            use_memory_store: true,
            storage: StorageConfig {
                internal_endpoint: "http://minio:9000".to_string(),
                public_endpoint: public_endpoint.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_memory_mode_starts_without_credentials() {
        let state = AppState::new(memory_config("https://files.example.com")).unwrap();
        assert_eq!(state.storage.backend_name(), "memory");
    }

    #[test]
    fn test_memory_mode_rejects_malformed_public_endpoint() {
        let result = AppState::new(memory_config("files.example.com"));
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }
}
