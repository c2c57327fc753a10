/// Prefix for every API route (the health checks live outside it).
pub const API_BASE: &str = "/api";

/// Default server-level concurrency limit when `HTTP_CONCURRENCY_LIMIT` is unset.
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Allowance for multipart framing on top of the document bytes themselves.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
