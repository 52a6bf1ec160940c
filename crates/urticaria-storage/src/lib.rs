//! # Urticaria Storage
//!
//! Object storage gateway for urticaria research data and medical record files.
//!
//! This crate provides:
//! - **Key derivation**: flat keys and `owner/category/...` record keys
//! - **Storage clients**: S3-compatible backend and an in-memory store
//! - **URL rewriting**: internal endpoint to public endpoint, query stripped
//! - **Gateways**: put, presign and rewrite in one call
//!
//! ## Architecture
//!
//! ```text
//! caller ──► Gateway ──► keys ──► StorageClient::put
//!                                 StorageClient::presigned_get_url
//!                                 EndpointRewriter ──► URL
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use urticaria_storage::{
//!     EndpointRewriter, ObjectPublisher, RecordUploadGateway, S3StorageClient, StorageConfig,
//! };
//! use std::sync::Arc;
//!
//! let config = StorageConfig { /* ... */ ..Default::default() };
//! let storage = Arc::new(S3StorageClient::new(&config)?);
//! let publisher = ObjectPublisher::from_config(storage, &config);
//! let gateway = RecordUploadGateway::new(
//!     publisher,
//!     &config.record_bucket,
//!     EndpointRewriter::new(&config.internal_endpoint, &config.public_endpoint),
//! );
//! let url = gateway.upload("u1", "xray", "1700000000000", "png", bytes).await?;
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod keys;
pub mod rewrite;
pub mod storage;

pub use config::{StorageConfig, DEFAULT_PRESIGN_TTL, DEFAULT_RECORD_BUCKET, DEFAULT_UPLOAD_BUCKET};
pub use error::{GatewayError, Result, StorageError};
pub use gateway::{ObjectPublisher, RecordUploadGateway, UploadGateway, UploadRequest};
pub use keys::{extension_of, flat_key, record_key};
pub use rewrite::{strip_query, EndpointRewriter};
pub use storage::{MemoryStorageClient, S3StorageClient, StorageClient, StorageResult};
