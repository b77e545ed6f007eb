//! Record sink trait and output error types

use crate::record::JobRecord;
use thiserror::Error;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write records: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// An append-only destination for extracted records
///
/// Implementations must tolerate being invoked across separate runs: a
/// second append to an existing destination adds rows without disturbing
/// what a previous (possibly crashed) run already wrote.
pub trait RecordSink {
    /// Appends records, returning how many were written
    fn append(&mut self, records: &[JobRecord]) -> OutputResult<usize>;
}
