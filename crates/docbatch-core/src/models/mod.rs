//! Data models for the application
//!
//! Every model here is transient and lives for a single batch request.

mod document;
mod format;

pub use document::*;
pub use format::*;
