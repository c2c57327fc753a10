//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use docbatch_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docbatch API",
        version = "0.1.0",
        description = "Batch document conversion. Upload several documents in one multipart request and receive a single zip archive with every document converted to the requested format."
    ),
    paths(
        handlers::batch_convert::convert_batch,
        handlers::formats::list_formats,
        handlers::health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        models::TargetFormat,
        models::StrategyKind,
        handlers::formats::FormatInfo,
        handlers::formats::FormatsResponse,
        handlers::health::HealthCheckResponse,
    )),
    tags(
        (name = "batch", description = "Batch document conversion"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
