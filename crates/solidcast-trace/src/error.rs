//! Error types for ray tracing.

use solidcast_resource::ResourceError;
use thiserror::Error;

/// Errors a ray shot can surface to the caller.
///
/// A ray that strikes nothing is a *miss*, delivered through the miss
/// callback, not an error. The error path exists so callers can tell
/// "nothing there" apart from "could not compute".
#[derive(Error, Debug)]
pub enum TraceError {
    /// The worker's arena hit its ceiling; a process-wide resource
    /// problem, not a per-ray anomaly.
    #[error("resource exhausted while tracing: {0}")]
    Resource(#[from] ResourceError),
}

/// Result type for ray tracing operations.
pub type Result<T> = std::result::Result<T, TraceError>;
