use std::collections::HashSet;
use std::path::Path;

use docbatch_core::{AppError, SourceDocument};

/// Validation errors for a single uploaded document
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {filename} is {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Content type {content_type} does not match extension '{extension}'")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file: {0}")]
    EmptyFile(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

/// Content types browsers send when they don't know better; never cross-checked.
const GENERIC_CONTENT_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

/// Upload intake checks for a conversion batch.
pub struct DocumentValidator {
    max_file_size: usize,
    max_files: usize,
    allowed_extensions: Vec<String>,
}

impl DocumentValidator {
    pub fn new(max_file_size: usize, max_files: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            max_files,
            allowed_extensions,
        }
    }

    pub fn from_config(config: &docbatch_core::Config) -> Self {
        Self::new(
            config.max_document_size_bytes(),
            config.max_files_per_batch(),
            config.document_allowed_extensions().to_vec(),
        )
    }

    /// Validate a whole batch and return it with sanitised, unique file names.
    ///
    /// Fails on the first offending file; nothing is written to disk here.
    pub fn validate_batch(
        &self,
        documents: Vec<SourceDocument>,
    ) -> Result<Vec<SourceDocument>, AppError> {
        if documents.is_empty() {
            return Err(AppError::NoFiles);
        }
        if documents.len() > self.max_files {
            return Err(AppError::TooManyFiles {
                count: documents.len(),
                max: self.max_files,
            });
        }

        let mut taken = HashSet::new();
        let mut accepted = Vec::with_capacity(documents.len());
        for (index, mut doc) in documents.into_iter().enumerate() {
            let safe_name = sanitize_filename(&doc.filename)
                .ok_or_else(|| ValidationError::InvalidFilename(doc.filename.clone()))?;
            self.validate_file_size(&safe_name, doc.size())?;
            let extension = self.validate_extension(&safe_name)?;
            if let Some(content_type) = doc.content_type.as_deref() {
                validate_extension_content_type_match(&extension, content_type)?;
            }

            doc.filename = unique_name(&safe_name, &mut taken);
            tracing::debug!(
                index,
                file = %doc.filename,
                size = doc.size(),
                "Accepted document for conversion"
            );
            accepted.push(doc);
        }

        Ok(accepted)
    }

    pub fn validate_file_size(&self, filename: &str, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile(filename.to_string()));
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                filename: filename.to_string(),
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Returns the lowercased extension when it is allowed.
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }
}

/// Reject a declared Content-Type that clearly contradicts the extension.
fn validate_extension_content_type_match(
    extension: &str,
    content_type: &str,
) -> Result<(), ValidationError> {
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if normalized.is_empty() || GENERIC_CONTENT_TYPES.contains(&normalized.as_str()) {
        return Ok(());
    }

    let expected: &[&str] = match extension {
        "doc" => &["application/msword"],
        "docx" => &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
        "odt" => &["application/vnd.oasis.opendocument.text"],
        "rtf" => &["application/rtf", "text/rtf"],
        "txt" => &["text/plain"],
        "html" | "htm" => &["text/html"],
        "xls" => &["application/vnd.ms-excel"],
        "xlsx" => &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"],
        "ods" => &["application/vnd.oasis.opendocument.spreadsheet"],
        "ppt" => &["application/vnd.ms-powerpoint"],
        "pptx" => &["application/vnd.openxmlformats-officedocument.presentationml.presentation"],
        "odp" => &["application/vnd.oasis.opendocument.presentation"],
        _ => {
            tracing::debug!(
                extension = %extension,
                content_type = %content_type,
                "Unknown extension, skipping Content-Type/extension cross-validation"
            );
            return Ok(());
        }
    };

    if !expected.contains(&normalized.as_str()) {
        return Err(ValidationError::ContentTypeMismatch {
            content_type: content_type.to_string(),
            extension: extension.to_string(),
        });
    }

    Ok(())
}

/// Base name of an uploaded file name, with path components of either separator stripped.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return None;
    }
    Some(base.to_string())
}

/// Keep stems unique (case-insensitive): outputs are named `<stem>.<target>`, so `a.docx` and
/// `a.txt` in one batch become `a.docx` and `a_1.txt`.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str());

    if taken.insert(stem.to_lowercase()) {
        return name.to_string();
    }

    let mut n = 1;
    loop {
        let candidate = format!("{}_{}", stem, n);
        if taken.insert(candidate.to_lowercase()) {
            return match ext {
                Some(ext) => format!("{}.{}", candidate, ext),
                None => candidate,
            };
        }
        n += 1;
    }
}
