//! Metadata sink trait and error types

use crate::crawler::VeteranRecord;
use crate::is_storage_full;
use thiserror::Error;

/// Errors that can occur while persisting a metadata row
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Returns true if the write failed because the disk is full
    pub fn is_storage_full(&self) -> bool {
        match self {
            Self::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(io) => is_storage_full(io),
                _ => false,
            },
            Self::Io(e) => is_storage_full(e),
        }
    }
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for metadata records
///
/// Rows are appended in the order images are confirmed saved. Implementations
/// must persist each row before returning so an interrupted run keeps every row
/// written so far.
pub trait MetadataSink {
    /// Appends exactly one row
    fn append(&mut self, record: &VeteranRecord) -> SinkResult<()>;

    /// Rows appended by this sink instance
    fn rows_written(&self) -> u64;
}
