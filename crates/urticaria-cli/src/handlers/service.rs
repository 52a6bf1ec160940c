//! Service-level handlers

use crate::ApiError;
use axum::{http::StatusCode, response::IntoResponse};

/// GET /health - Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Fallback for unmapped routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Fallback for known routes called with the wrong method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
