//! Docbatch Processing Library
//!
//! The batch document-conversion pipeline: upload validation, request workspaces, strategy
//! selection, per-file conversion and archive packaging.

pub mod archive;
pub mod converter;
pub mod native;
pub mod pipeline;
pub mod render;
pub mod strategy;
pub mod validator;
pub mod workspace;

pub use archive::package_zip;
pub use converter::{DocumentConverter, FileConverter};
pub use native::NativeConverter;
pub use pipeline::{BatchOutput, BatchPipeline};
pub use render::{
    ChromiumRendererFactory, MarkupConverter, OfficeMarkupConverter, PageRenderer,
    RenderConverter, RendererFactory,
};
pub use strategy::{detect_native_converter, ConversionStrategy, StrategySelector};
pub use validator::{DocumentValidator, ValidationError};
pub use workspace::Workspace;
