use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::format::TargetFormat;
use crate::error::AppError;

/// One uploaded source document, held in memory until it is written into a workspace.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Sanitised base name, unique within its batch.
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl SourceDocument {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data,
        }
    }

    /// Lowercased extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    /// Name of the converted output for this source.
    pub fn output_name(&self, target: TargetFormat) -> String {
        format!("{}.{}", self.stem(), target.extension())
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// The documents of a single `POST /api/batch/{format}` request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub batch_id: Uuid,
    pub target: TargetFormat,
    pub documents: Vec<SourceDocument>,
}

impl ConversionRequest {
    pub fn new(target: TargetFormat, documents: Vec<SourceDocument>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            target,
            documents,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// One produced output document inside a workspace's output area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub source_filename: String,
    pub output_path: PathBuf,
    pub size_bytes: u64,
}

impl ConversionResult {
    /// Base name the output is stored under in the archive.
    pub fn entry_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_filename.clone())
    }
}

/// Conversion backend chosen for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Local document-conversion binary
    Native,
    /// Markup conversion followed by headless browser printing
    Render,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Native => f.write_str("native"),
            StrategyKind::Render => f.write_str("render"),
        }
    }
}

/// Lifecycle of one file within a batch. Files never return to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Pending,
    Converting,
    Done,
    Failed,
}

impl FileState {
    /// Move to `next`, rejecting anything outside `pending -> converting -> done|failed`.
    pub fn transition(self, next: FileState) -> Result<FileState, AppError> {
        let allowed = matches!(
            (self, next),
            (FileState::Pending, FileState::Converting)
                | (FileState::Converting, FileState::Done)
                | (FileState::Converting, FileState::Failed)
        );
        if allowed {
            Ok(next)
        } else {
            Err(AppError::Internal(format!(
                "invalid file state transition {} -> {}",
                self, next
            )))
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileState::Pending => "pending",
            FileState::Converting => "converting",
            FileState::Done => "done",
            FileState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name_replaces_extension() {
        let doc = SourceDocument::new("report.final.DOCX", None, Bytes::from_static(b"x"));
        assert_eq!(doc.extension().as_deref(), Some("docx"));
        assert_eq!(doc.output_name(TargetFormat::Pdf), "report.final.pdf");

        let bare = SourceDocument::new("README", None, Bytes::new());
        assert_eq!(bare.extension(), None);
        assert_eq!(bare.output_name(TargetFormat::Txt), "README.txt");
    }

    #[test]
    fn test_file_state_forward_only() {
        let state = FileState::Pending;
        let state = state.transition(FileState::Converting).unwrap();
        let done = state.transition(FileState::Done).unwrap();
        assert_eq!(done, FileState::Done);

        assert!(done.transition(FileState::Pending).is_err());
        assert!(FileState::Failed.transition(FileState::Converting).is_err());
        assert!(FileState::Pending.transition(FileState::Done).is_err());
    }

    #[test]
    fn test_entry_name_is_base_name() {
        let result = ConversionResult {
            source_filename: "a.docx".to_string(),
            output_path: PathBuf::from("/tmp/ws/output/a.pdf"),
            size_bytes: 10,
        };
        assert_eq!(result.entry_name(), "a.pdf");
    }
}
