//! Docbatch Infrastructure Library
//!
//! Shared infrastructure used by the docbatch service:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - Batch admission control

pub mod capacity;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use capacity::{BatchAdmission, BatchPermit};
pub use middleware::{request_id_middleware, RequestId};
pub use telemetry::{init_telemetry, shutdown_telemetry};
