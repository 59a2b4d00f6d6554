//! Worker error types

use thiserror::Error;
use upline_core::CoreError;

/// Worker result type
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Worker error type
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Core engine error that aborts the whole run (per-user errors are
    /// tallied, not raised)
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Run was configured incorrectly
    #[error("Invalid runner configuration: {reason}")]
    InvalidConfig { reason: String },
}
