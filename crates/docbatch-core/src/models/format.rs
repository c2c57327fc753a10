use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Output format a batch is converted to. Taken from the `/api/batch/{format}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Pdf,
    Docx,
    Odt,
    Html,
    Txt,
    Xlsx,
    Ods,
    Pptx,
    Odp,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 9] = [
        TargetFormat::Pdf,
        TargetFormat::Docx,
        TargetFormat::Odt,
        TargetFormat::Html,
        TargetFormat::Txt,
        TargetFormat::Xlsx,
        TargetFormat::Ods,
        TargetFormat::Pptx,
        TargetFormat::Odp,
    ];

    /// File extension (without the dot) of produced documents.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Pdf => "pdf",
            TargetFormat::Docx => "docx",
            TargetFormat::Odt => "odt",
            TargetFormat::Html => "html",
            TargetFormat::Txt => "txt",
            TargetFormat::Xlsx => "xlsx",
            TargetFormat::Ods => "ods",
            TargetFormat::Pptx => "pptx",
            TargetFormat::Odp => "odp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::Pdf => "application/pdf",
            TargetFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            TargetFormat::Odt => "application/vnd.oasis.opendocument.text",
            TargetFormat::Html => "text/html",
            TargetFormat::Txt => "text/plain",
            TargetFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            TargetFormat::Ods => "application/vnd.oasis.opendocument.spreadsheet",
            TargetFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            TargetFormat::Odp => "application/vnd.oasis.opendocument.presentation",
        }
    }

    /// Value passed to the native converter's `--convert-to` flag.
    ///
    /// The part before `:` is always the output extension; some targets pin an export filter.
    pub fn native_filter(&self) -> &'static str {
        match self {
            TargetFormat::Txt => "txt:Text",
            TargetFormat::Html => "html:XHTML Writer File:UTF8",
            other => other.extension(),
        }
    }

    /// Whether the headless browser strategy can produce this format.
    pub fn supported_by_render(&self) -> bool {
        matches!(self, TargetFormat::Pdf)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        TargetFormat::ALL
            .iter()
            .copied()
            .find(|f| f.extension() == normalized)
            .ok_or_else(|| AppError::UnsupportedFormat(s.to_string()))
    }
}
