//! Object key derivation
//!
//! Two layouts are supported:
//!
//! - **Flat**: the caller's file name is the key, as-is. Re-uploading the same
//!   name overwrites the previous object.
//! - **Record**: `owner/category/owner-category-timestamp.ext`, which groups
//!   uploads into virtual folders per owner and category.

use crate::{GatewayError, Result};

/// Separator between virtual folders in an object key
pub const KEY_DELIMITER: char = '/';

/// Build a flat key from a caller supplied file name.
///
/// The name is stored verbatim, so anything a backend would normalise or refuse
/// is rejected here: leading or trailing `/`, empty, `.` or `..` segments and
/// control characters.
pub fn flat_key(file_name: &str) -> Result<String> {
    if file_name.is_empty() {
        return Err(GatewayError::invalid("file name must not be empty"));
    }
    if file_name.starts_with(KEY_DELIMITER) || file_name.ends_with(KEY_DELIMITER) {
        return Err(GatewayError::invalid(format!(
            "file name must not start or end with '{KEY_DELIMITER}': {file_name}"
        )));
    }
    if file_name.chars().any(char::is_control) {
        return Err(GatewayError::invalid(format!(
            "file name contains a control character: {file_name:?}"
        )));
    }
    for segment in file_name.split(KEY_DELIMITER) {
        match segment {
            "" => {
                return Err(GatewayError::invalid(format!(
                    "file name contains an empty path segment: {file_name}"
                )))
            }
            "." | ".." => {
                return Err(GatewayError::invalid(format!(
                    "file name contains a relative path segment: {file_name}"
                )))
            }
            _ => {}
        }
    }
    Ok(file_name.to_string())
}

/// Build the key for a categorized record upload.
///
/// The timestamp only makes keys unique per `(owner, category)`; it is never parsed.
/// An empty extension drops the trailing dot.
pub fn record_key(owner_id: &str, category: &str, timestamp: &str, extension: &str) -> Result<String> {
    check_folder("owner id", owner_id)?;
    check_folder("category", category)?;
    check_component("timestamp", timestamp)?;
    check_component("extension", extension)?;

    let mut file_name = format!("{owner_id}-{category}-{timestamp}");
    if !extension.is_empty() {
        file_name.push('.');
        file_name.push_str(extension);
    }

    Ok(format!("{owner_id}{KEY_DELIMITER}{category}{KEY_DELIMITER}{file_name}"))
}

/// Extension of an uploaded file name, without the dot.
///
/// Only the final path component is considered, so `dir.v2/scan` has no extension.
pub fn extension_of(file_name: Option<&str>) -> &str {
    let Some(name) = file_name else {
        return "";
    };
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(idx) => &base[idx + 1..],
        None => "",
    }
}

fn check_folder(label: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(GatewayError::invalid(format!("{label} must not be empty")));
    }
    if value.contains(['/', '\\']) {
        return Err(GatewayError::invalid(format!(
            "{label} must not contain a path separator: {value}"
        )));
    }
    if value.contains("..") {
        return Err(GatewayError::invalid(format!(
            "{label} must not contain '..': {value}"
        )));
    }
    Ok(())
}

fn check_component(label: &str, value: &str) -> Result<()> {
    if value.contains(['/', '\\']) {
        return Err(GatewayError::invalid(format!(
            "{label} must not contain a path separator: {value}"
        )));
    }
    Ok(())
}
