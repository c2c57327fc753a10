//! Health check handlers and response types.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use docbatch_core::StrategyKind;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub service: String,
    pub environment: String,
    /// Strategy a batch started now would use.
    pub strategy: StrategyKind,
    pub native_converter: String,
    pub batches_in_flight: usize,
    pub batch_limit: usize,
}

/// Liveness check - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Service health, including a fresh check of the native converter.
///
/// A host without the native converter is still healthy; it serves PDF batches through the
/// headless renderer.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let strategy = state.pipeline.selector().detect().await;
    let status = if state.admission.in_flight() >= state.admission.limit() {
        "busy"
    } else {
        "healthy"
    };

    let response = HealthCheckResponse {
        status: status.to_string(),
        service: state.config.service_name().to_string(),
        environment: state.config.environment().to_string(),
        strategy,
        native_converter: state.pipeline.selector().native_path().to_string(),
        batches_in_flight: state.admission.in_flight(),
        batch_limit: state.admission.limit(),
    };

    (StatusCode::OK, Json(response))
}
