//! Sequential, resumable-by-retry transfer of chunked resources.
//!
//! # Architecture
//!
//! ```text
//! ChunkDownloader::download(job, folder)
//!         │
//!         ├── ChunkCursor   (current URI + index, drives ChunkSequencer)
//!         ├── RetryState    (consecutive failures on the current chunk)
//!         ├── ChunkTransport (GET → body stream | NotFound | Transient | Fatal)
//!         └── output file   (one committed chunk at a time, in order)
//! ```
//!
//! Per job the loop moves through
//! `Fetching → Writing → (Fetching | Done)`, detouring through
//! `Retrying → Fetching` on transient failures until the retry bound is hit.

mod downloader;
mod error;
mod progress;
mod state;

pub use downloader::ChunkDownloader;
pub use error::{TransferError, TransferResult};
pub use progress::{ChunkProgress, ChunkProgressCallback, DownloadSummary};
pub use state::{ChunkCursor, RetryState};
