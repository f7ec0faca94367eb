//! Download job description.

use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;

/// Default separator between a chunk's name prefix and its number.
pub const DEFAULT_SEPARATOR: char = '_';

/// Default extension of the assembled output file.
pub const DEFAULT_EXTENSION: &str = ".ts";

/// Errors building a [`DownloadJob`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The resource name is empty or would escape the output folder.
    #[error("invalid resource name {0:?}")]
    InvalidName(String),

    /// The initial chunk URI could not be parsed.
    #[error("invalid chunk URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },
}

/// How the transfer loop decides it has fetched the last chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// Stop after the chunk whose index equals `last_index`.
    Count { last_index: u64 },
    /// Keep going until a chunk answers not-found.
    Sentinel,
}

/// One resource to download.
///
/// Immutable once built; the transfer loop keeps its own cursor and retry
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    name: String,
    initial_uri: Url,
    separator: char,
    extension: String,
    zero_pad: bool,
    termination: TerminationPolicy,
}

impl DownloadJob {
    /// Create a sentinel-terminated job with default separator, padding and
    /// extension.
    pub fn new(name: impl Into<String>, initial_uri: &str) -> Result<Self, JobError> {
        let name = name.into();
        if name.trim().is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == ".."
        {
            return Err(JobError::InvalidName(name));
        }

        let initial_uri = Url::parse(initial_uri).map_err(|e| JobError::InvalidUri {
            uri: initial_uri.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name,
            initial_uri,
            separator: DEFAULT_SEPARATOR,
            extension: DEFAULT_EXTENSION.to_string(),
            zero_pad: true,
            termination: TerminationPolicy::Sentinel,
        })
    }

    /// Set the chunk-number separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the output file extension. A missing leading dot is added.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = if extension.is_empty() || extension.starts_with('.') {
            extension
        } else {
            format!(".{}", extension)
        };
        self
    }

    /// Enable or disable zero-padding of chunk numbers.
    pub fn with_zero_pad(mut self, zero_pad: bool) -> Self {
        self.zero_pad = zero_pad;
        self
    }

    /// Stop after the chunk numbered `last_index`.
    pub fn with_last_chunk(mut self, last_index: u64) -> Self {
        self.termination = TerminationPolicy::Count { last_index };
        self
    }

    /// Set the termination policy.
    pub fn with_termination(mut self, termination: TerminationPolicy) -> Self {
        self.termination = termination;
        self
    }

    /// Resource name, used as the output file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URI of the first chunk.
    pub fn initial_uri(&self) -> &Url {
        &self.initial_uri
    }

    /// Chunk-number separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Output file extension, including the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether chunk numbers are zero-padded.
    pub fn zero_pad(&self) -> bool {
        self.zero_pad
    }

    /// Termination policy.
    pub fn termination(&self) -> TerminationPolicy {
        self.termination
    }

    /// `{folder}/{name}{extension}`.
    pub fn output_path(&self, folder: &Path) -> PathBuf {
        folder.join(format!("{}{}", self.name, self.extension))
    }
}
