//! Medical record upload handler

use super::{read_upload, FIELD_FILE, FIELD_RECORD_TYPE, FIELD_USER_ID};
use crate::{ApiError, AppState};
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Identifiers may also arrive on the query string
#[derive(Debug, Default, Deserialize)]
pub struct RecordParams {
    pub user_id: Option<String>,
    pub record_type: Option<String>,
}

/// POST /api/v1/medical-records/upload - Store a record file under `user/type/`
pub async fn upload_record(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecordParams>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (request, has_file) = read_upload(multipart).await?;

    let owner_id = request
        .owner_id
        .clone()
        .or(params.user_id)
        .ok_or(ApiError::MissingParameter(FIELD_USER_ID))?;
    let category = request
        .category
        .clone()
        .or(params.record_type)
        .ok_or(ApiError::MissingParameter(FIELD_RECORD_TYPE))?;
    if !has_file {
        return Err(ApiError::MissingParameter(FIELD_FILE));
    }

    let timestamp = chrono::Utc::now().timestamp_millis().to_string();
    let extension = request.extension().to_string();

    let url = state
        .record_gateway
        .upload(&owner_id, &category, &timestamp, &extension, request.content)
        .await?;

    Ok((StatusCode::CREATED, url).into_response())
}
