use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderMap, Response, StatusCode},
    Extension,
};
use docbatch_core::TargetFormat;
use docbatch_infra::RequestId;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_documents, multipart_rejection_error};

pub const BATCH_ID_HEADER: &str = "X-Batch-ID";
pub const STRATEGY_HEADER: &str = "X-Conversion-Strategy";

/// `converted_pdfs.zip` for a `pdf` batch.
pub fn archive_file_name(target: TargetFormat) -> String {
    format!("converted_{}s.zip", target.extension())
}

#[utoipa::path(
    post,
    path = "/api/batch/{format}",
    tag = "batch",
    params(
        ("format" = String, Path, description = "Target format: pdf, docx, odt, html, txt, xlsx, ods, pptx or odp")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "One or more documents, each in a part named 'files'"),
    responses(
        (status = 200, description = "Zip archive with one converted file per upload", content_type = "application/zip"),
        (status = 400, description = "No files, too many files, bad file or unknown format", body = ErrorResponse),
        (status = 413, description = "A document exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "A document failed to convert or the archive could not be built", body = ErrorResponse),
        (status = 503, description = "Too many batches in progress", body = ErrorResponse)
    )
)]
pub async fn convert_batch(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response<Body>, HttpAppError> {
    let target: TargetFormat = format.parse()?;

    // Held until the archive has been built and the workspace reaped.
    let _permit = state.admission.try_admit()?;

    let multipart =
        multipart.map_err(|rejection| multipart_rejection_error(&rejection, &headers))?;
    let documents = extract_multipart_documents(multipart).await?;
    let output = state.pipeline.run(target, documents).await?;

    tracing::info!(
        request_id = request_id.as_ref().map(|Extension(id)| id.0.as_str()).unwrap_or("-"),
        batch_id = %output.batch_id,
        files = output.file_count,
        archive_bytes = output.archive.len(),
        "Sending batch archive"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", archive_file_name(target)),
        )
        .header(header::CONTENT_LENGTH, output.archive.len())
        .header(BATCH_ID_HEADER, output.batch_id.to_string())
        .header(STRATEGY_HEADER, output.strategy.to_string())
        .body(Body::from(output.archive))
        .map_err(|e| HttpAppError::from(anyhow::Error::new(e)))
}
