use std::sync::Arc;

use axum::{extract::State, Json};
use docbatch_core::{StrategyKind, TargetFormat};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FormatInfo {
    pub format: TargetFormat,
    pub extension: String,
    pub mime_type: String,
    /// Strategies able to produce this format.
    pub strategies: Vec<StrategyKind>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormatsResponse {
    pub formats: Vec<FormatInfo>,
    pub accepted_extensions: Vec<String>,
    pub max_files_per_batch: usize,
    pub max_document_size_bytes: usize,
}

pub fn format_info(format: TargetFormat) -> FormatInfo {
    let mut strategies = vec![StrategyKind::Native];
    if format.supported_by_render() {
        strategies.push(StrategyKind::Render);
    }
    FormatInfo {
        format,
        extension: format.extension().to_string(),
        mime_type: format.mime_type().to_string(),
        strategies,
    }
}

#[utoipa::path(
    get,
    path = "/api/formats",
    tag = "batch",
    responses(
        (status = 200, description = "Supported target formats and upload limits", body = FormatsResponse)
    )
)]
pub async fn list_formats(State(state): State<Arc<AppState>>) -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: TargetFormat::ALL.iter().copied().map(format_info).collect(),
        accepted_extensions: state.config.document_allowed_extensions().to_vec(),
        max_files_per_batch: state.config.max_files_per_batch(),
        max_document_size_bytes: state.config.max_document_size_bytes(),
    })
}
