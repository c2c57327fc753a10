//! Route configuration and setup.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use docbatch_core::Config;
use docbatch_infra::request_id_middleware;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api_doc::get_openapi_spec;
use crate::constants::{API_BASE, DEFAULT_HTTP_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};
use crate::handlers::{batch_convert, formats, health};
use crate::state::AppState;

/// Build the full router: API routes, health checks, docs and the middleware stack.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let body_limit = request_body_limit(config);
    tracing::info!(body_limit_bytes = body_limit, "Request body limit enabled");

    let app = Router::new()
        .route(
            &format!("{}/batch/{{format}}", API_BASE),
            post(batch_convert::convert_batch),
        )
        .route(&format!("{}/formats", API_BASE), get(formats::list_formats))
        .route(
            &format!("{}/openapi.json", API_BASE),
            get(|| async { Json(get_openapi_spec()) }),
        )
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .merge(utoipa_rapidoc::RapiDoc::new(format!("{}/openapi.json", API_BASE)).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// A full batch of maximum-size documents plus multipart framing.
fn request_body_limit(config: &Config) -> usize {
    config
        .max_document_size_bytes()
        .saturating_mul(config.max_files_per_batch())
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
