//! HTTP request handlers

pub mod record;
pub mod service;
pub mod upload;

pub use record::*;
pub use service::*;
pub use upload::*;

use crate::ApiError;
use axum::extract::Multipart;
use urticaria_storage::UploadRequest;

/// Multipart part carrying the file bytes
pub const FIELD_FILE: &str = "file";
/// Form field with the uploader id
pub const FIELD_USER_ID: &str = "user_id";
/// Form field with the record category
pub const FIELD_RECORD_TYPE: &str = "record_type";

/// Collect the known multipart fields into an [`UploadRequest`].
///
/// Unknown parts are drained and ignored. A later duplicate overrides an earlier one.
pub async fn read_upload(mut multipart: Multipart) -> Result<(UploadRequest, bool), ApiError> {
    let mut request = UploadRequest::default();
    let mut has_file = false;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FIELD_FILE) => {
                request.file_name = field.file_name().map(str::to_string);
                request.content = field.bytes().await?;
                has_file = true;
            }
            Some(FIELD_USER_ID) => request.owner_id = Some(field.text().await?),
            Some(FIELD_RECORD_TYPE) => request.category = Some(field.text().await?),
            other => {
                tracing::debug!(field = ?other, "Ignoring multipart field");
                field.bytes().await?;
            }
        }
    }

    Ok((request, has_file))
}
