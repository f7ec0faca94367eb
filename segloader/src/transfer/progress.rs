//! Progress and summary records for a download job.

use std::path::PathBuf;
use std::time::Duration;

/// Snapshot taken after each committed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkProgress {
    /// Resource being downloaded.
    pub resource: String,
    /// Index of the chunk just written.
    pub chunk_index: u64,
    /// Chunks written so far, this one included.
    pub chunks_completed: u64,
    /// Bytes written to the destination so far.
    pub bytes_written: u64,
}

/// Observer called after every committed chunk.
pub type ChunkProgressCallback = dyn Fn(&ChunkProgress) + Send + Sync;

/// Outcome of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Resource name.
    pub resource: String,
    /// Assembled output file.
    pub path: PathBuf,
    /// Number of chunks written.
    pub chunks: u64,
    /// Size of the output file in bytes.
    pub bytes: u64,
    /// Retries performed across all chunks.
    pub retries: u32,
    /// Wall-clock time since the loop started.
    pub elapsed: Duration,
}

impl DownloadSummary {
    /// Average throughput in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_second() {
        let summary = DownloadSummary {
            resource: "a".to_string(),
            path: PathBuf::from("a.ts"),
            chunks: 2,
            bytes: 1000,
            retries: 0,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(summary.bytes_per_second(), 500.0);
    }

    #[test]
    fn test_bytes_per_second_zero_elapsed() {
        let summary = DownloadSummary {
            resource: "a".to_string(),
            path: PathBuf::from("a.ts"),
            chunks: 0,
            bytes: 0,
            retries: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(summary.bytes_per_second(), 0.0);
    }
}
