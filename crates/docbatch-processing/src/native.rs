//! Native strategy: shell out to a local office-suite converter.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use docbatch_core::{AppError, SourceDocument, StrategyKind, TargetFormat};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::process::Command;

use crate::converter::DocumentConverter;

/// Bytes left literal in a `file://` URL path.
const FILE_URL_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn file_url(path: &Path) -> String {
    format!(
        "file://{}",
        utf8_percent_encode(&path.to_string_lossy(), FILE_URL_PATH)
    )
}

/// Runs `<binary> --headless --convert-to <fmt> --outdir <dir> <input>`.
#[derive(Debug, Clone)]
pub struct NativeConverter {
    binary_path: String,
}

impl NativeConverter {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    fn build_args(input_path: &Path, target: TargetFormat, output_dir: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(8);
        // Private profile per workspace; instances sharing the default profile block each other.
        if let Some(workspace_root) = output_dir.parent() {
            args.push(format!(
                "-env:UserInstallation={}",
                file_url(&workspace_root.join("profile"))
            ));
        }
        args.extend([
            "--headless".to_string(),
            "--convert-to".to_string(),
            target.native_filter().to_string(),
            "--outdir".to_string(),
            output_dir.to_string_lossy().to_string(),
            input_path.to_string_lossy().to_string(),
        ]);
        args
    }
}

#[async_trait]
impl DocumentConverter for NativeConverter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Native
    }

    #[tracing::instrument(skip(self, doc, input_path, output_path), fields(file = %doc.filename))]
    async fn convert(
        &self,
        doc: &SourceDocument,
        input_path: &Path,
        target: TargetFormat,
        output_path: &Path,
    ) -> Result<(), AppError> {
        let output_dir = output_path.parent().ok_or_else(|| {
            AppError::Internal(format!("output path {} has no parent", output_path.display()))
        })?;
        let args = Self::build_args(input_path, target, output_dir);

        let output = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::ConversionFailed {
                file: doc.filename.clone(),
                reason: format!("failed to execute {}: {}", self.binary_path, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ConversionFailed {
                file: doc.filename.clone(),
                reason: format!("converter exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_args_follow_converter_contract() {
        let args = NativeConverter::build_args(
            Path::new("/ws/input/a.docx"),
            TargetFormat::Pdf,
            Path::new("/ws/output"),
        );
        assert_eq!(args[0], "-env:UserInstallation=file:///ws/profile");
        assert_eq!(
            &args[1..],
            &["--headless", "--convert-to", "pdf", "--outdir", "/ws/output", "/ws/input/a.docx"]
        );
    }

    #[test]
    fn test_profile_url_is_percent_encoded() {
        let args = NativeConverter::build_args(
            Path::new("/tmp/my dir/ws#1/input/a.docx"),
            TargetFormat::Pdf,
            Path::new("/tmp/my dir/ws#1/output"),
        );
        assert_eq!(
            args[0],
            "-env:UserInstallation=file:///tmp/my%20dir/ws%231/profile"
        );
        let args = NativeConverter::build_args(
            Path::new("/tmp/caf\u{e9}/input/a.docx"),
            TargetFormat::Pdf,
            Path::new("/tmp/caf\u{e9}/output"),
        );
        assert_eq!(args[0], "-env:UserInstallation=file:///tmp/caf%C3%A9/profile");
        assert_eq!(args[5], "/tmp/caf\u{e9}/output");
    }

    #[tokio::test]
    async fn test_missing_binary_is_conversion_failure() {
        let converter = NativeConverter::new("/nonexistent/docbatch-converter");
        let doc = SourceDocument::new("a.docx", None, bytes::Bytes::from_static(b"PK"));
        let err = converter
            .convert(
                &doc,
                Path::new("/nonexistent/a.docx"),
                TargetFormat::Pdf,
                &PathBuf::from("/nonexistent/out/a.pdf"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConversionFailed { ref file, .. } if file == "a.docx"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let converter = NativeConverter::new("false");
        let doc = SourceDocument::new("a.docx", None, bytes::Bytes::from_static(b"PK"));
        let err = converter
            .convert(
                &doc,
                Path::new("/tmp/a.docx"),
                TargetFormat::Pdf,
                Path::new("/tmp/out/a.pdf"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConversionFailed { .. }));
    }
}
