//! Multipart intake for batch uploads

use axum::extract::{multipart::MultipartRejection, Multipart};
use axum::http::{header, HeaderMap};
use docbatch_core::{AppError, SourceDocument};

/// Form field carrying the documents; repeated once per file.
pub const FILES_FIELD: &str = "files";

/// Error for a request axum could not open as multipart.
///
/// A bodiless request is an upload with no files; anything else is malformed input.
pub fn multipart_rejection_error(rejection: &MultipartRejection, headers: &HeaderMap) -> AppError {
    if is_empty_body(headers) {
        return AppError::NoFiles;
    }
    AppError::InvalidInput(format!(
        "Expected a multipart/form-data body with '{}' fields: {}",
        FILES_FIELD,
        rejection.body_text()
    ))
}

fn is_empty_body(headers: &HeaderMap) -> bool {
    match headers.get(header::CONTENT_LENGTH) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            == Some(0),
        None => {
            headers.get(header::CONTENT_TYPE).is_none()
                && headers.get(header::TRANSFER_ENCODING).is_none()
        }
    }
}

/// Collect every `files` part of the form in arrival order. Other fields are ignored.
///
/// Returns an empty list when no file was attached; the pipeline turns that into
/// [`AppError::NoFiles`].
pub async fn extract_multipart_documents(
    mut multipart: Multipart,
) -> Result<Vec<SourceDocument>, AppError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("document_{}", documents.len() + 1));
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        // Browsers send an empty part when the file input was left blank.
        if data.is_empty() && filename.is_empty() {
            continue;
        }

        documents.push(SourceDocument::new(filename, content_type, data));
    }

    tracing::debug!(files = documents.len(), "Multipart upload parsed");
    Ok(documents)
}
