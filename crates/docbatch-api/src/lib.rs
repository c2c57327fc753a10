//! Docbatch API Library
//!
//! HTTP handlers, error mapping and application setup for the batch conversion service.

mod api_doc;
pub mod constants;
mod handlers;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
