//! Application state shared by every handler.

use std::sync::Arc;

use docbatch_core::Config;
use docbatch_infra::BatchAdmission;
use docbatch_processing::BatchPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<BatchPipeline>,
    pub admission: BatchAdmission,
}

impl AppState {
    /// Production wiring: native converter with the Chromium fallback, limits from `config`.
    pub fn from_config(config: Config) -> Self {
        let pipeline = Arc::new(BatchPipeline::from_config(&config));
        Self::with_pipeline(config, pipeline)
    }

    /// Same limits, caller-supplied pipeline (used to swap converters in tests).
    pub fn with_pipeline(config: Config, pipeline: Arc<BatchPipeline>) -> Self {
        let admission = BatchAdmission::from_config(&config);
        Self {
            config,
            pipeline,
            admission,
        }
    }
}
