//! Docbatch Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! all docbatch components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ConverterServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ConversionRequest, ConversionResult, FileState, SourceDocument, StrategyKind, TargetFormat,
};
