//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = middleware::cors_layer(&state.config.cors);

    Router::new()
        // Service endpoints
        .route("/health", get(handlers::health_check))

        // Upload endpoints
        .route("/api/v1/upload", post(handlers::upload_file))
        .route("/api/v1/medical-records/upload", post(handlers::upload_record))

        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)

        // Apply middleware
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}
