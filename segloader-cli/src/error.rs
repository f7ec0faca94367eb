//! CLI error type.

use segloader::batch::BatchError;
use segloader::config::ConfigError;
use segloader::job::JobError;
use segloader::{TransferError, TransportError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to set up logging: {0}")]
    Logging(String),

    #[error("failed to create Tokio runtime: {0}")]
    Runtime(String),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("download of {name} failed: {source}")]
    Download {
        name: String,
        #[source]
        source: TransferError,
    },

    #[error("{failed} of {total} downloads failed, {skipped} not run")]
    BatchFailed {
        failed: usize,
        skipped: usize,
        total: usize,
    },
}
