//! Generic upload handler

use super::read_upload;
use crate::{ApiError, AppState};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// POST /api/v1/upload - Store a file under its original name
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (request, has_file) = read_upload(multipart).await?;
    if !has_file {
        return Err(ApiError::MissingParameter(super::FIELD_FILE));
    }

    let file_name = request.file_name.unwrap_or_default();
    let url = state.upload_gateway.upload(&file_name, request.content).await?;

    Ok((StatusCode::OK, url).into_response())
}
