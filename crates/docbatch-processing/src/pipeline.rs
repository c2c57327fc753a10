//! Batch pipeline: intake -> workspace -> strategy -> per-file conversion -> archive -> reap.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use docbatch_core::{
    AppError, Config, ConversionRequest, ConversionResult, SourceDocument, StrategyKind,
    TargetFormat,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::archive::package_zip;
use crate::converter::FileConverter;
use crate::strategy::{ConversionStrategy, StrategySelector};
use crate::validator::DocumentValidator;
use crate::workspace::Workspace;

const ARCHIVE_FILE_NAME: &str = "converted.zip";

/// A finished batch, ready to be sent to the caller.
#[derive(Debug)]
pub struct BatchOutput {
    pub batch_id: Uuid,
    pub target: TargetFormat,
    pub strategy: StrategyKind,
    pub file_count: usize,
    pub archive: Vec<u8>,
}

pub struct BatchPipeline {
    validator: DocumentValidator,
    selector: StrategySelector,
    workspace_root: PathBuf,
    conversion_timeout: Duration,
}

impl BatchPipeline {
    pub fn new(
        validator: DocumentValidator,
        selector: StrategySelector,
        workspace_root: PathBuf,
        conversion_timeout: Duration,
    ) -> Self {
        Self {
            validator,
            selector,
            workspace_root,
            conversion_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            DocumentValidator::from_config(config),
            StrategySelector::from_config(config),
            config.workspace_root().to_path_buf(),
            config.conversion_timeout(),
        )
    }

    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    /// Convert every document to `target` and return them as one zip archive.
    ///
    /// All-or-nothing: the first failing file fails the batch. The workspace is removed on every
    /// path, including when this future is dropped.
    pub async fn run(
        &self,
        target: TargetFormat,
        documents: Vec<SourceDocument>,
    ) -> Result<BatchOutput, AppError> {
        let documents = self.validator.validate_batch(documents)?;
        let request = ConversionRequest::new(target, documents);
        let span = tracing::info_span!("batch", batch_id = %request.batch_id, format = %target);

        async move {
            let started = Instant::now();
            tracing::info!(files = request.len(), "Starting batch conversion");

            let workspace = Workspace::allocate(&self.workspace_root).await?;
            let outcome = self.convert_and_package(&request, &workspace).await;
            workspace.reap().await;

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &outcome {
                Ok(output) => tracing::info!(
                    strategy = %output.strategy,
                    archive_bytes = output.archive.len(),
                    elapsed_ms,
                    "Batch conversion finished"
                ),
                Err(e) => tracing::warn!(error = %e, elapsed_ms, "Batch conversion failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn convert_and_package(
        &self,
        request: &ConversionRequest,
        workspace: &Workspace,
    ) -> Result<BatchOutput, AppError> {
        let strategy = self.selector.select(request.target, workspace.root()).await?;
        tracing::info!(strategy = %strategy.kind(), "Selected conversion strategy");

        let converted = self.convert_all(request, workspace, &strategy).await;
        strategy.finish().await;
        let results = converted?;

        let archive = package_zip(&results, &workspace.root().join(ARCHIVE_FILE_NAME)).await?;

        Ok(BatchOutput {
            batch_id: request.batch_id,
            target: request.target,
            strategy: strategy.kind(),
            file_count: results.len(),
            archive,
        })
    }

    /// Sequential, fail-fast.
    async fn convert_all(
        &self,
        request: &ConversionRequest,
        workspace: &Workspace,
        strategy: &ConversionStrategy,
    ) -> Result<Vec<ConversionResult>, AppError> {
        let converter = FileConverter::new(strategy.converter(), self.conversion_timeout);
        let mut results = Vec::with_capacity(request.len());
        for doc in &request.documents {
            results.push(converter.convert_one(workspace, doc, request.target).await?);
        }
        Ok(results)
    }
}
