//! Segloader - sequential downloads of chunked resources
//!
//! Streaming media and other large resources are often published as a run of
//! numbered chunk files (`video_001.ts`, `video_002.ts`, ...). This library
//! walks such a run from its first chunk, fetching each one in order and
//! appending it to a single output file, with bounded retries on transient
//! network failures.
//!
//! - [`sequencer`]: derive the next chunk URI from the current one
//! - [`transfer`]: the download loop ([`ChunkDownloader`])
//! - [`transport`]: the HTTP boundary ([`ChunkTransport`], [`ReqwestTransport`])
//! - [`job`]: what to download ([`DownloadJob`])
//! - [`config`]: downloader settings and `config.ini`
//! - [`batch`]: JSON batch descriptors

pub mod batch;
pub mod config;
pub mod job;
pub mod sequencer;
pub mod transfer;
pub mod transport;

pub use config::{ConfigFile, DownloaderConfig};
pub use job::{DownloadJob, TerminationPolicy};
pub use sequencer::{ChunkSequencer, SequenceError};
pub use transfer::{ChunkDownloader, ChunkProgress, DownloadSummary, TransferError};
pub use transport::{ChunkTransport, ReqwestTransport, TransportError};
