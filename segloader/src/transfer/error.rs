//! Error types for the transfer loop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::sequencer::SequenceError;
use crate::transport::TransportError;

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Reasons a download job fails.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The chunk naming scheme cannot be followed. Never retried.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// The job cannot run as configured.
    #[error("invalid job: {0}")]
    InvalidJob(String),

    /// Failed to create the destination folder.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// Failed to create or truncate the destination file.
    #[error("failed to create {}: {source}", path.display())]
    CreateFile { path: PathBuf, source: io::Error },

    /// Failed to append a chunk to the destination file.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// A chunk that had to exist answered not-found.
    #[error("chunk {index} not found at {url}")]
    ChunkNotFound { index: u64, url: String },

    /// The transport reported a non-retryable failure.
    #[error("chunk {index} failed: {source}")]
    Fatal {
        index: u64,
        #[source]
        source: TransportError,
    },

    /// The same chunk failed too many times in a row.
    #[error("chunk {index} failed {failures} times in a row: {source}")]
    RetriesExhausted {
        index: u64,
        failures: u32,
        #[source]
        source: TransportError,
    },
}

impl TransferError {
    /// Whether the failure came from the chunk naming scheme.
    pub fn is_invalid_token(&self) -> bool {
        matches!(
            self,
            Self::Sequence(SequenceError::InvalidChunkToken { .. })
        )
    }

    /// Whether the failure came from the local file system.
    pub fn is_file_system(&self) -> bool {
        matches!(
            self,
            Self::CreateDir { .. } | Self::CreateFile { .. } | Self::Write { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_display_and_source() {
        let err = TransferError::RetriesExhausted {
            index: 4,
            failures: 3,
            source: TransportError::transient("http://h/a_4.ts", "connection reset"),
        };
        assert_eq!(
            err.to_string(),
            "chunk 4 failed 3 times in a row: transient failure fetching http://h/a_4.ts: connection reset"
        );
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn test_classification_helpers() {
        let token = TransferError::from(SequenceError::InvalidChunkToken {
            segment: "a_x.ts".to_string(),
            token: "x".to_string(),
        });
        assert!(token.is_invalid_token());
        assert!(!token.is_file_system());

        let write = TransferError::Write {
            path: PathBuf::from("/out/a.ts"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(write.is_file_system());
        assert!(write.to_string().contains("/out/a.ts"));
    }
}
