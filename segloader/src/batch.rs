//! JSON batch descriptors.
//!
//! A batch file is an ordered array of job specifications:
//!
//! ```json
//! [
//!   { "name": "intro", "uri": "https://cdn.example.com/a/seg_001.ts", "last_chunk": 40 },
//!   { "name": "talk", "uri": "https://cdn.example.com/b/part-0.ts", "separator": "-" }
//! ]
//! ```
//!
//! Only `name` and `uri` are required. Jobs without `last_chunk` run until a
//! chunk answers not-found.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::{DownloadJob, JobError, DEFAULT_EXTENSION, DEFAULT_SEPARATOR};

/// Errors loading a batch file.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The file could not be read.
    #[error("failed to read batch file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid batch descriptor.
    #[error("failed to parse batch file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Two jobs would write the same output file.
    #[error("jobs {first} and {second} both write {}", path.display())]
    DuplicateOutput {
        first: String,
        second: String,
        path: PathBuf,
    },
}

/// One entry of a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Resource name, used as the output file stem.
    pub name: String,

    /// URI of the first chunk.
    pub uri: String,

    /// Chunk-number separator.
    #[serde(default = "default_separator")]
    pub separator: char,

    /// Index of the last chunk, if known.
    #[serde(default)]
    pub last_chunk: Option<u64>,

    /// Whether chunk numbers are zero-padded.
    #[serde(default = "default_zero_pad")]
    pub zero_pad: bool,

    /// Output file extension.
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

fn default_zero_pad() -> bool {
    true
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl JobSpec {
    /// Build the download job this entry describes.
    pub fn into_job(self) -> Result<DownloadJob, JobError> {
        let job = DownloadJob::new(self.name, &self.uri)?
            .with_separator(self.separator)
            .with_zero_pad(self.zero_pad)
            .with_extension(self.extension);

        Ok(match self.last_chunk {
            Some(last) => job.with_last_chunk(last),
            None => job,
        })
    }
}

/// Parse a batch descriptor from JSON text.
pub fn parse_batch(text: &str) -> Result<Vec<JobSpec>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Load a batch descriptor from `path`.
pub fn load_batch(path: &Path) -> Result<Vec<JobSpec>, BatchError> {
    let text = fs::read_to_string(path).map_err(|e| BatchError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_batch(&text).map_err(|e| BatchError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reject job lists where two jobs resolve to the same file in `folder`.
///
/// Each job truncates its destination on start, so a shared path would
/// silently lose one job's output.
pub fn check_unique_outputs(jobs: &[DownloadJob], folder: &Path) -> Result<(), BatchError> {
    let mut seen: HashMap<PathBuf, &str> = HashMap::with_capacity(jobs.len());
    for job in jobs {
        let path = job.output_path(folder);
        if let Some(first) = seen.insert(path.clone(), job.name()) {
            return Err(BatchError::DuplicateOutput {
                first: first.to_string(),
                second: job.name().to_string(),
                path,
            });
        }
    }
    Ok(())
}
