//! Per-job mutable state for the transfer loop.
//!
//! Both structs live only for the duration of one download call.

use reqwest::Url;

use crate::sequencer::{chunk_index, ChunkSequencer, SequenceError};

/// Position of the transfer loop within the chunk sequence.
#[derive(Debug, Clone)]
pub struct ChunkCursor {
    uri: Url,
    index: u64,
    sequencer: ChunkSequencer,
}

impl ChunkCursor {
    /// Start at `uri`, reading its index with the sequencer's token rule.
    pub fn start(uri: Url, separator: char, zero_pad: bool) -> Result<Self, SequenceError> {
        let index = chunk_index(&uri, separator)?;
        Ok(Self {
            uri,
            index,
            sequencer: ChunkSequencer::new(separator, zero_pad),
        })
    }

    /// URI of the current chunk.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Index of the current chunk.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Move to the following chunk.
    pub fn advance(&mut self) -> Result<(), SequenceError> {
        let next = self.sequencer.next(&self.uri)?;
        self.uri = next.uri;
        self.index = next.index;
        Ok(())
    }
}

/// Consecutive-failure counter for the current chunk.
#[derive(Debug, Clone)]
pub struct RetryState {
    failures: u32,
    max_retries: u32,
    total_retries: u32,
}

impl RetryState {
    /// Create a counter that gives up after `max_retries` consecutive
    /// failures.
    pub fn new(max_retries: u32) -> Self {
        Self {
            failures: 0,
            max_retries,
            total_retries: 0,
        }
    }

    /// Record a failed attempt.
    ///
    /// Returns `true` if another attempt is allowed.
    pub fn record_failure(&mut self) -> bool {
        self.failures += 1;
        if self.failures >= self.max_retries {
            return false;
        }
        self.total_retries += 1;
        true
    }

    /// Reset after a committed chunk.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures on the current chunk.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Retries performed across the whole job.
    pub fn total_retries(&self) -> u32 {
        self.total_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_start_and_advance() {
        let uri = Url::parse("https://h/v/seg_009.ts").unwrap();
        let mut cursor = ChunkCursor::start(uri, '_', true).unwrap();
        assert_eq!(cursor.index(), 9);

        cursor.advance().unwrap();
        assert_eq!(cursor.index(), 10);
        assert_eq!(cursor.uri().as_str(), "https://h/v/seg_010.ts");
    }

    #[test]
    fn test_cursor_rejects_bad_token() {
        let uri = Url::parse("https://h/v/seg_x.ts").unwrap();
        assert!(ChunkCursor::start(uri, '_', true).is_err());
    }

    #[test]
    fn test_retry_state_bound() {
        let mut retry = RetryState::new(3);
        assert!(retry.record_failure());
        assert!(retry.record_failure());
        assert!(!retry.record_failure());
        assert_eq!(retry.failures(), 3);
        assert_eq!(retry.total_retries(), 2);
    }

    #[test]
    fn test_retry_state_reset() {
        let mut retry = RetryState::new(3);
        retry.record_failure();
        retry.record_failure();
        retry.reset();
        assert_eq!(retry.failures(), 0);
        assert!(retry.record_failure());
        assert_eq!(retry.total_retries(), 3);
    }
}
