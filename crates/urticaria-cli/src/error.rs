//! API error type and its JSON rendering

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use urticaria_storage::GatewayError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Parameter '{0}' is required")]
    MissingParameter(&'static str),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Resource not found")]
    NotFound,

    #[error("Request method not supported")]
    MethodNotAllowed,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::Multipart(e) => e.status(),
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Gateway(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server-side failures stay generic.
    fn public_message(&self) -> String {
        match self {
            Self::Gateway(GatewayError::InvalidArgument(msg)) => msg.clone(),
            Self::Gateway(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Internal server error");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = json!({
            "status": status.as_u16(),
            "error": self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}
