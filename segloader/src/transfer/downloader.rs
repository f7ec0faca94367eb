//! The resilient transfer loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use super::error::{TransferError, TransferResult};
use super::progress::{ChunkProgress, ChunkProgressCallback, DownloadSummary};
use super::state::{ChunkCursor, RetryState};
use crate::config::DownloaderConfig;
use crate::job::{DownloadJob, TerminationPolicy};
use crate::transport::{ChunkTransport, ReqwestTransport, TransportError};

/// Downloads chunked resources one chunk at a time into a single file.
///
/// A downloader holds no per-job state, so one instance can drive several
/// jobs concurrently; each `download` call owns its own cursor, retry counter
/// and file handle.
///
/// # Example
///
/// ```ignore
/// use segloader::{ChunkDownloader, DownloadJob, DownloaderConfig};
///
/// let downloader = ChunkDownloader::new(DownloaderConfig::default())?;
/// let job = DownloadJob::new("lecture", "https://cdn.example.com/v/seg_001.ts")?
///     .with_last_chunk(120);
/// let summary = downloader.download(&job, "output".as_ref()).await?;
/// println!("{} bytes in {:?}", summary.bytes, summary.elapsed);
/// ```
#[derive(Clone)]
pub struct ChunkDownloader {
    transport: Arc<dyn ChunkTransport>,
    config: DownloaderConfig,
    on_progress: Option<Arc<ChunkProgressCallback>>,
}

impl ChunkDownloader {
    /// Create a downloader backed by [`ReqwestTransport`].
    pub fn new(config: DownloaderConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create a downloader over any transport.
    pub fn with_transport(transport: Arc<dyn ChunkTransport>, config: DownloaderConfig) -> Self {
        Self {
            transport,
            config,
            on_progress: None,
        }
    }

    /// Register an observer called after every committed chunk.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ChunkProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Download every chunk of `job` into `{folder}/{name}{extension}`.
    ///
    /// The folder is created if needed and the output file truncated. Each
    /// chunk is read completely before it is appended, so a failure while a
    /// body is streaming never leaves a partial chunk in the file. On error
    /// the chunks committed so far remain on disk.
    pub async fn download(&self, job: &DownloadJob, folder: &Path) -> TransferResult<DownloadSummary> {
        let started = Instant::now();
        let termination = job.termination();

        let mut cursor =
            ChunkCursor::start(job.initial_uri().clone(), job.separator(), job.zero_pad())?;

        if let TerminationPolicy::Count { last_index } = termination {
            if last_index < cursor.index() {
                return Err(TransferError::InvalidJob(format!(
                    "last chunk {} precedes first chunk {}",
                    last_index,
                    cursor.index()
                )));
            }
        }

        tracing::debug!(folder = %folder.display(), "Preparing output folder");
        fs::create_dir_all(folder)
            .await
            .map_err(|e| TransferError::CreateDir {
                path: folder.to_path_buf(),
                source: e,
            })?;

        let path = job.output_path(folder);
        let mut file = File::create(&path)
            .await
            .map_err(|e| TransferError::CreateFile {
                path: path.clone(),
                source: e,
            })?;

        let mut retry = RetryState::new(self.config.max_retries);
        let mut chunks = 0u64;
        let mut bytes = 0u64;

        loop {
            let index = cursor.index();
            let url = cursor.uri().as_str();

            let body = match self.fetch_chunk(url).await {
                Ok(body) => body,
                Err(TransportError::NotFound { url }) => {
                    if termination == TerminationPolicy::Sentinel && chunks > 0 {
                        tracing::debug!(chunk = index, "No further chunks");
                        break;
                    }
                    return Err(TransferError::ChunkNotFound { index, url });
                }
                Err(err) if err.is_transient() => {
                    if !retry.record_failure() {
                        return Err(TransferError::RetriesExhausted {
                            index,
                            failures: retry.failures(),
                            source: err,
                        });
                    }
                    tracing::warn!(
                        chunk = index,
                        attempt = retry.failures(),
                        error = %err,
                        "Chunk fetch failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff).await;
                    continue;
                }
                Err(err) => return Err(TransferError::Fatal { index, source: err }),
            };

            file.write_all(&body).await.map_err(|e| TransferError::Write {
                path: path.clone(),
                source: e,
            })?;
            file.flush().await.map_err(|e| TransferError::Write {
                path: path.clone(),
                source: e,
            })?;

            chunks += 1;
            bytes += body.len() as u64;
            retry.reset();

            tracing::info!(
                chunk = index,
                path = %path.display(),
                bytes = body.len(),
                "Chunk downloaded"
            );

            if let Some(ref callback) = self.on_progress {
                callback(&ChunkProgress {
                    resource: job.name().to_string(),
                    chunk_index: index,
                    chunks_completed: chunks,
                    bytes_written: bytes,
                });
            }

            if matches!(termination, TerminationPolicy::Count { last_index } if last_index == index) {
                break;
            }

            cursor.advance()?;
            tracing::debug!(chunk = cursor.index(), url = %cursor.uri(), "Advancing");
        }

        drop(file);

        let elapsed = started.elapsed();
        tracing::info!(
            resource = job.name(),
            path = %path.display(),
            size = bytes,
            duration = ?elapsed,
            "Resource downloaded"
        );

        Ok(DownloadSummary {
            resource: job.name().to_string(),
            path,
            chunks,
            bytes,
            retries: retry.total_retries(),
            elapsed,
        })
    }

    /// Fetch one chunk body into memory.
    async fn fetch_chunk(&self, url: &str) -> Result<Bytes, TransportError> {
        let mut stream = self.transport.get(url).await?;
        let mut body = BytesMut::new();
        while let Some(piece) = stream.next().await {
            body.extend_from_slice(&piece?);
        }
        Ok(body.freeze())
    }
}
