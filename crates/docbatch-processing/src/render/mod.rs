//! Headless-render strategy: source -> HTML -> browser print.

pub mod browser;
pub mod markup;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docbatch_core::{AppError, SourceDocument, StrategyKind, TargetFormat};

pub use browser::{ChromiumRendererFactory, PageRenderer, RendererFactory};
pub use markup::{MarkupConverter, OfficeMarkupConverter};

use crate::converter::DocumentConverter;

pub struct RenderConverter {
    markup: Arc<dyn MarkupConverter>,
    renderer: Box<dyn PageRenderer>,
}

impl RenderConverter {
    pub fn new(markup: Arc<dyn MarkupConverter>, renderer: Box<dyn PageRenderer>) -> Self {
        Self { markup, renderer }
    }

    /// Shut the batch's browser down.
    pub async fn finish(&self) {
        self.renderer.close().await;
    }
}

#[async_trait]
impl DocumentConverter for RenderConverter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Render
    }

    async fn convert(
        &self,
        doc: &SourceDocument,
        _input_path: &Path,
        target: TargetFormat,
        output_path: &Path,
    ) -> Result<(), AppError> {
        if !target.supported_by_render() {
            return Err(AppError::ConverterUnavailable(format!(
                "target '{}' requires the native converter, which is not installed",
                target
            )));
        }

        let html = self.markup.to_html(doc)?;
        let pdf = self
            .renderer
            .render_pdf(&html)
            .await
            .map_err(|e| AppError::ConversionFailed {
                file: doc.filename.clone(),
                reason: format!("{:#}", e),
            })?;

        tokio::fs::write(output_path, &pdf)
            .await
            .map_err(|e| AppError::ConversionFailed {
                file: doc.filename.clone(),
                reason: format!("could not write output: {}", e),
            })?;
        Ok(())
    }
}
