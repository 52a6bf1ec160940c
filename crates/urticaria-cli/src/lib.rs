//! # Urticaria Gateway
//!
//! HTTP front end for the urticaria storage gateway.
//!
//! This crate provides:
//! - **Generic upload**: `POST /api/v1/upload` stores a file under its own name
//! - **Record upload**: `POST /api/v1/medical-records/upload` stores a file under
//!   `user_id/record_type/` and returns its public URL
//! - **JSON errors**: `{"status": ..., "error": ...}` for every failure
//! - **CORS**: configurable, permissive by default
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Browsers / mobile clients              │
//! └─────────────────────────┬───────────────────────────┘
//!                           │ multipart/form-data
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  urticaria-gateway                  │
//! ├─────────────────────────────────────────────────────┤
//! │    CORS │ Request ID │ Logging │ Body limit         │
//! ├─────────────────────────────────────────────────────┤
//! │                 urticaria-storage                   │
//! │    (keys, put + presign, endpoint rewriting)        │
//! ├─────────────────────────────────────────────────────┤
//! │              MinIO / S3-compatible store            │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{CorsConfig, GatewayConfig};
pub use error::ApiError;
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
