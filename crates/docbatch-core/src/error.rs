//! Error types module
//!
//! All failures that can cross a crate boundary are unified under [`AppError`]. The
//! [`ErrorMetadata`] trait lets each variant describe how it is presented to HTTP
//! clients (status, machine code, log level) so handlers never hand-pick status codes.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like admission rejections
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CONVERSION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No files provided")]
    NoFiles,

    #[error("Too many files: {count} supplied, at most {max} allowed per batch")]
    TooManyFiles { count: usize, max: usize },

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to allocate workspace: {0}")]
    WorkspaceAllocation(String),

    #[error("Conversion failed for '{file}': {reason}")]
    ConversionFailed { file: String, reason: String },

    #[error("Conversion of '{file}' exceeded the {secs}s deadline")]
    ConversionTimeout { file: String, secs: u64 },

    #[error("No converter available: {0}")]
    ConverterUnavailable(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Server busy: {0}")]
    Overloaded(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant:
/// (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoFiles => (
            400,
            "NO_FILES",
            false,
            Some("Attach one or more documents in the 'files' form field"),
            false,
            LogLevel::Debug,
        ),
        AppError::TooManyFiles { .. } => (
            400,
            "BATCH_SIZE_EXCEEDED",
            false,
            Some("Split the upload into smaller batches"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedFormat(_) => (
            400,
            "UNSUPPORTED_FORMAT",
            false,
            Some("Use GET /api/formats to list supported target formats"),
            false,
            LogLevel::Debug,
        ),
        AppError::WorkspaceAllocation(_) => (
            500,
            "WORKSPACE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::ConversionFailed { .. } => (
            500,
            "CONVERSION_FAILED",
            false,
            Some("Check that every document opens correctly, then retry"),
            false,
            LogLevel::Error,
        ),
        AppError::ConversionTimeout { .. } => (
            500,
            "CONVERSION_TIMEOUT",
            true,
            Some("Retry with fewer or smaller documents"),
            false,
            LogLevel::Error,
        ),
        AppError::ConverterUnavailable(_) => (
            500,
            "CONVERTER_UNAVAILABLE",
            false,
            Some("Request a PDF target or contact support"),
            false,
            LogLevel::Error,
        ),
        AppError::Archive(_) => (
            500,
            "ARCHIVE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Overloaded(_) => (
            503,
            "SERVER_BUSY",
            true,
            Some("Wait a few seconds and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NoFiles => "NoFiles",
            AppError::TooManyFiles { .. } => "TooManyFiles",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::UnsupportedFormat(_) => "UnsupportedFormat",
            AppError::WorkspaceAllocation(_) => "WorkspaceAllocation",
            AppError::ConversionFailed { .. } => "ConversionFailed",
            AppError::ConversionTimeout { .. } => "ConversionTimeout",
            AppError::ConverterUnavailable(_) => "ConverterUnavailable",
            AppError::Archive(_) => "Archive",
            AppError::Overloaded(_) => "Overloaded",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NoFiles => "No files provided".to_string(),
            AppError::TooManyFiles { .. } => self.to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::UnsupportedFormat(ref msg) => format!("Unsupported format: {}", msg),
            AppError::WorkspaceAllocation(_) => {
                "Failed to prepare conversion workspace".to_string()
            }
            AppError::ConversionFailed { ref file, .. } => {
                format!("Conversion failed for '{}'", file)
            }
            AppError::ConversionTimeout { .. } => self.to_string(),
            AppError::ConverterUnavailable(ref msg) => msg.clone(),
            AppError::Archive(_) => "Failed to build result archive".to_string(),
            AppError::Overloaded(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
