//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use docbatch_core::Config;

use crate::state::AppState;

/// Validate configuration, start tracing and build the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    docbatch_infra::init_telemetry(config.service_name(), config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let state = Arc::new(AppState::from_config(config.clone()));
    let initial_strategy = state.pipeline.selector().detect().await;
    tracing::info!(
        strategy = %initial_strategy,
        native_converter = %config.native_converter_path(),
        "Conversion backend detected"
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
