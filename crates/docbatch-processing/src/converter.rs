//! Per-file conversion: one source document in, exactly one output document out.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use docbatch_core::{
    AppError, ConversionResult, FileState, SourceDocument, StrategyKind, TargetFormat,
};

use crate::workspace::Workspace;

/// A conversion backend.
///
/// Implementations write the converted document to `output_path` or return an error. They do not
/// enforce deadlines; [`FileConverter`] does, by dropping the future.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn convert(
        &self,
        doc: &SourceDocument,
        input_path: &Path,
        target: TargetFormat,
        output_path: &Path,
    ) -> Result<(), AppError>;
}

/// Drives one file through `pending -> converting -> done | failed`.
pub struct FileConverter<'a> {
    converter: &'a dyn DocumentConverter,
    timeout: Duration,
}

impl<'a> FileConverter<'a> {
    pub fn new(converter: &'a dyn DocumentConverter, timeout: Duration) -> Self {
        Self { converter, timeout }
    }

    /// Stage `doc` in the workspace, convert it and verify the output exists.
    pub async fn convert_one(
        &self,
        workspace: &Workspace,
        doc: &SourceDocument,
        target: TargetFormat,
    ) -> Result<ConversionResult, AppError> {
        let mut state = FileState::Pending;
        let output_path = workspace.output_dir().join(doc.output_name(target));

        let input_path = workspace.write_input(doc).await?;
        state = self.advance(state, FileState::Converting, doc)?;

        let started = Instant::now();
        let outcome = match tokio::time::timeout(
            self.timeout,
            self.converter.convert(doc, &input_path, target, &output_path),
        )
        .await
        {
            Ok(Ok(())) => verify_output(doc, &output_path).await,
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::ConversionTimeout {
                file: doc.filename.clone(),
                secs: self.timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(size_bytes) => {
                self.advance(state, FileState::Done, doc)?;
                tracing::info!(
                    file = %doc.filename,
                    strategy = %self.converter.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    size_bytes,
                    "Converted document"
                );
                Ok(ConversionResult {
                    source_filename: doc.filename.clone(),
                    output_path,
                    size_bytes,
                })
            }
            Err(e) => {
                self.advance(state, FileState::Failed, doc)?;
                tracing::warn!(
                    file = %doc.filename,
                    strategy = %self.converter.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Document conversion failed"
                );
                Err(e)
            }
        }
    }

    fn advance(
        &self,
        from: FileState,
        to: FileState,
        doc: &SourceDocument,
    ) -> Result<FileState, AppError> {
        let next = from.transition(to)?;
        tracing::debug!(file = %doc.filename, from = %from, to = %next, "File state change");
        Ok(next)
    }
}

/// The converter claiming success is not enough: the file must be on disk.
async fn verify_output(doc: &SourceDocument, output_path: &Path) -> Result<u64, AppError> {
    match tokio::fs::metadata(output_path).await {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        _ => Err(AppError::ConversionFailed {
            file: doc.filename.clone(),
            reason: format!(
                "converter reported success but {} was not produced",
                output_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ),
        }),
    }
}
