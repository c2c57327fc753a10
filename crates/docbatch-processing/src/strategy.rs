//! Conversion Strategy Selector.
//!
//! Decides once per batch between the native converter and the headless-render fallback.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use docbatch_core::{AppError, Config, StrategyKind, TargetFormat};
use tokio::process::Command;

use crate::converter::DocumentConverter;
use crate::native::NativeConverter;
use crate::render::{
    ChromiumRendererFactory, MarkupConverter, OfficeMarkupConverter, RenderConverter,
    RendererFactory,
};

/// True when `<binary> --version` exits successfully within `timeout`.
pub async fn detect_native_converter(binary_path: &str, timeout: Duration) -> bool {
    let check = Command::new(binary_path)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    match tokio::time::timeout(timeout, check).await {
        Ok(Ok(status)) if status.success() => true,
        Ok(Ok(status)) => {
            tracing::debug!(binary = %binary_path, %status, "Native converter check failed");
            false
        }
        Ok(Err(e)) => {
            tracing::debug!(binary = %binary_path, error = %e, "Native converter not runnable");
            false
        }
        Err(_) => {
            tracing::warn!(
                binary = %binary_path,
                timeout_secs = timeout.as_secs(),
                "Native converter check timed out"
            );
            false
        }
    }
}

/// The backend a whole batch is converted with.
pub enum ConversionStrategy {
    Native(NativeConverter),
    Render(RenderConverter),
}

impl ConversionStrategy {
    pub fn kind(&self) -> StrategyKind {
        self.converter().kind()
    }

    pub fn converter(&self) -> &dyn DocumentConverter {
        match self {
            ConversionStrategy::Native(native) => native,
            ConversionStrategy::Render(render) => render,
        }
    }

    /// Release per-batch resources (the render strategy's browser).
    pub async fn finish(&self) {
        if let ConversionStrategy::Render(render) = self {
            render.finish().await;
        }
    }
}

#[derive(Clone)]
pub struct StrategySelector {
    native_path: String,
    detect_timeout: Duration,
    markup: Arc<dyn MarkupConverter>,
    renderers: Arc<dyn RendererFactory>,
}

impl StrategySelector {
    pub fn new(
        native_path: impl Into<String>,
        detect_timeout: Duration,
        markup: Arc<dyn MarkupConverter>,
        renderers: Arc<dyn RendererFactory>,
    ) -> Self {
        Self {
            native_path: native_path.into(),
            detect_timeout,
            markup,
            renderers,
        }
    }

    /// Native converter from config, Chromium + built-in markup conversion as the fallback.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.native_converter_path(),
            config.detect_timeout(),
            Arc::new(OfficeMarkupConverter),
            Arc::new(ChromiumRendererFactory::new(
                config.chromium_path().map(PathBuf::from),
            )),
        )
    }

    pub fn native_path(&self) -> &str {
        &self.native_path
    }

    /// Which strategy a batch started now would get.
    pub async fn detect(&self) -> StrategyKind {
        if detect_native_converter(&self.native_path, self.detect_timeout).await {
            StrategyKind::Native
        } else {
            StrategyKind::Render
        }
    }

    /// Detect and build the strategy for one batch.
    ///
    /// `scratch_dir` must be inside the batch workspace.
    pub async fn select(
        &self,
        target: TargetFormat,
        scratch_dir: &Path,
    ) -> Result<ConversionStrategy, AppError> {
        match self.detect().await {
            StrategyKind::Native => Ok(ConversionStrategy::Native(NativeConverter::new(
                self.native_path.clone(),
            ))),
            StrategyKind::Render if target.supported_by_render() => {
                Ok(ConversionStrategy::Render(RenderConverter::new(
                    self.markup.clone(),
                    self.renderers.session(scratch_dir),
                )))
            }
            StrategyKind::Render => Err(AppError::ConverterUnavailable(format!(
                "'{}' output needs the native converter ({}), which is not available on this host",
                target, self.native_path
            ))),
        }
    }
}
