//! Output sink trait and error types
//!
//! A sink receives the full list of records collected so far and persists it,
//! replacing whatever an earlier snapshot wrote.

use crate::record::BookRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write snapshot to {path}: {message}")]
    Write { path: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for snapshot sinks
///
/// Every call receives the complete record list and must overwrite the
/// previous snapshot rather than append to it. Implementations are called from
/// the single collector of the worker pool, one snapshot at a time.
pub trait SnapshotSink: Send + Sync {
    /// Persists the full record list
    ///
    /// # Arguments
    ///
    /// * `records` - All records collected so far, in completion order
    fn write_snapshot(&self, records: &[BookRecord]) -> OutputResult<()>;

    /// Human-readable destination, used in log lines
    fn describe(&self) -> String;
}
