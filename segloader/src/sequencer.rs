//! Chunk URI sequencing.
//!
//! Segmented resources name their chunks with a numeric token embedded in the
//! last path segment, e.g. `https://cdn.example.com/live/video_003.ts`. The
//! [`ChunkSequencer`] derives the URI of the following chunk by incrementing
//! that token, without touching the network.
//!
//! # Token rule
//!
//! ```text
//! .../video_003.ts?sig=abc
//!     └──────────┘          last path segment
//!     └──────┘              stem (up to the first '.')
//!           └─┘             token (after the last separator)
//! ```
//!
//! Everything outside the token, including the query string, is preserved.

use reqwest::Url;
use thiserror::Error;

/// Errors produced while reading or advancing a chunk number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The numeric token of the segment is not a non-negative integer.
    #[error("invalid chunk token {token:?} in segment {segment:?}")]
    InvalidChunkToken { segment: String, token: String },

    /// The URI has no path segment to read a chunk number from.
    #[error("URI has no chunk segment: {uri}")]
    MissingSegment { uri: String },
}

/// The numeric part of a chunk segment, split into its surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkToken<'a> {
    /// Text before the token, separator included (`video_`).
    pub prefix: &'a str,
    /// The digits themselves (`003`).
    pub digits: &'a str,
    /// Text from the first `.` onward (`.ts`), possibly empty.
    pub suffix: &'a str,
    /// Parsed value of `digits`.
    pub value: u64,
}

/// Split a path segment into prefix, numeric token and suffix.
///
/// The stem is everything before the first `.`; the token is the part of the
/// stem after the last `separator`, or the whole stem if the separator does
/// not occur.
pub fn parse_segment(segment: &str, separator: char) -> Result<ChunkToken<'_>, SequenceError> {
    let stem_end = segment.find('.').unwrap_or(segment.len());
    let (stem, suffix) = segment.split_at(stem_end);

    let token_start = stem
        .rfind(separator)
        .map(|pos| pos + separator.len_utf8())
        .unwrap_or(0);
    let (prefix, digits) = stem.split_at(token_start);

    let invalid = || SequenceError::InvalidChunkToken {
        segment: segment.to_string(),
        token: digits.to_string(),
    };

    // u64::from_str accepts a leading '+', which is not a chunk number.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value = digits.parse::<u64>().map_err(|_| invalid())?;

    Ok(ChunkToken {
        prefix,
        digits,
        suffix,
        value,
    })
}

/// Last path segment of a URI (the text after the final `/`).
pub fn last_segment(uri: &Url) -> Result<&str, SequenceError> {
    let path = uri.path();
    let segment = path.rsplit('/').next().unwrap_or(path);
    if segment.is_empty() {
        return Err(SequenceError::MissingSegment {
            uri: uri.to_string(),
        });
    }
    Ok(segment)
}

/// Read the chunk index encoded in a URI.
pub fn chunk_index(uri: &Url, separator: char) -> Result<u64, SequenceError> {
    let segment = last_segment(uri)?;
    Ok(parse_segment(segment, separator)?.value)
}

/// Result of advancing to the next chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextChunk {
    /// URI of the next chunk.
    pub uri: Url,
    /// Index encoded in that URI.
    pub index: u64,
}

/// Computes successive chunk URIs.
///
/// The only state is the zero-padding width, which is measured from the
/// first token this sequencer sees and kept for its whole life.
#[derive(Debug, Clone)]
pub struct ChunkSequencer {
    separator: char,
    zero_pad: bool,
    pad_width: Option<usize>,
}

impl ChunkSequencer {
    /// Create a sequencer for chunks numbered after `separator`.
    pub fn new(separator: char, zero_pad: bool) -> Self {
        Self {
            separator,
            zero_pad,
            pad_width: None,
        }
    }

    /// The separator this sequencer splits on.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// The remembered padding width, once one has been observed.
    pub fn pad_width(&self) -> Option<usize> {
        self.pad_width
    }

    /// Compute the URI of the chunk after `uri`.
    pub fn next(&mut self, uri: &Url) -> Result<NextChunk, SequenceError> {
        let segment = last_segment(uri)?;
        let token = parse_segment(segment, self.separator)?;

        let index = token
            .value
            .checked_add(1)
            .ok_or_else(|| SequenceError::InvalidChunkToken {
                segment: segment.to_string(),
                token: token.digits.to_string(),
            })?;

        let digits = if self.zero_pad {
            let width = *self.pad_width.get_or_insert(token.digits.len());
            format!("{:0width$}", index, width = width)
        } else {
            index.to_string()
        };

        let next_segment = format!("{}{}{}", token.prefix, digits, token.suffix);

        let path = uri.path();
        let dir_len = path.len() - segment.len();
        let next_path = format!("{}{}", &path[..dir_len], next_segment);

        let mut next_uri = uri.clone();
        next_uri.set_path(&next_path);

        Ok(NextChunk {
            uri: next_uri,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_segment_splits_prefix_token_suffix() {
        let token = parse_segment("video_003.ts", '_').unwrap();
        assert_eq!(token.prefix, "video_");
        assert_eq!(token.digits, "003");
        assert_eq!(token.suffix, ".ts");
        assert_eq!(token.value, 3);
    }

    #[test]
    fn test_parse_segment_uses_last_separator() {
        let token = parse_segment("a_b_c_42.ts", '_').unwrap();
        assert_eq!(token.prefix, "a_b_c_");
        assert_eq!(token.value, 42);
    }

    #[test]
    fn test_parse_segment_drops_everything_after_first_dot() {
        let token = parse_segment("seg-7.ts.part", '-').unwrap();
        assert_eq!(token.suffix, ".ts.part");
        assert_eq!(token.value, 7);
    }

    #[test]
    fn test_parse_segment_without_separator_uses_whole_stem() {
        let token = parse_segment("0012.ts", '_').unwrap();
        assert_eq!(token.prefix, "");
        assert_eq!(token.value, 12);
    }

    #[test]
    fn test_parse_segment_without_extension() {
        let token = parse_segment("chunk_9", '_').unwrap();
        assert_eq!(token.suffix, "");
        assert_eq!(token.value, 9);
    }

    #[test]
    fn test_parse_segment_rejects_non_numeric() {
        let err = parse_segment("clip_abc.ts", '_').unwrap_err();
        assert_eq!(
            err,
            SequenceError::InvalidChunkToken {
                segment: "clip_abc.ts".to_string(),
                token: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_segment_rejects_signed_and_empty() {
        assert!(parse_segment("clip_+5.ts", '_').is_err());
        assert!(parse_segment("clip_-5.ts", '_').is_err());
        assert!(parse_segment("clip_.ts", '_').is_err());
    }

    #[test]
    fn test_parse_segment_rejects_overflow() {
        assert!(parse_segment("clip_99999999999999999999999.ts", '_').is_err());
    }

    #[test]
    fn test_chunk_index_reads_last_segment() {
        let uri = url("https://cdn.example.com/live/seg_001.ts");
        assert_eq!(chunk_index(&uri, '_').unwrap(), 1);
    }

    #[test]
    fn test_chunk_index_missing_segment() {
        let uri = url("https://cdn.example.com/live/");
        assert!(matches!(
            chunk_index(&uri, '_'),
            Err(SequenceError::MissingSegment { .. })
        ));
    }

    #[test]
    fn test_next_padded() {
        let mut seq = ChunkSequencer::new('_', true);
        let next = seq.next(&url("https://h/v/clip_007.ts")).unwrap();
        assert_eq!(next.uri.as_str(), "https://h/v/clip_008.ts");
        assert_eq!(next.index, 8);
        assert_eq!(seq.pad_width(), Some(3));
    }

    #[test]
    fn test_next_padded_overflow_renders_unpadded() {
        let mut seq = ChunkSequencer::new('_', true);
        let next = seq.next(&url("https://h/v/clip_999.ts")).unwrap();
        assert_eq!(next.uri.as_str(), "https://h/v/clip_1000.ts");
    }

    #[test]
    fn test_next_padded_099_to_100_keeps_width() {
        let mut seq = ChunkSequencer::new('_', true);
        let next = seq.next(&url("https://h/v/clip_099.ts")).unwrap();
        assert_eq!(next.uri.as_str(), "https://h/v/clip_100.ts");
    }

    #[test]
    fn test_pad_width_is_fixed_on_first_use() {
        let mut seq = ChunkSequencer::new('_', true);
        seq.next(&url("https://h/clip_0005.ts")).unwrap();
        // A later, shorter token is still padded to the first width.
        let next = seq.next(&url("https://h/clip_7.ts")).unwrap();
        assert_eq!(next.uri.as_str(), "https://h/clip_0008.ts");
        assert_eq!(seq.pad_width(), Some(4));
    }

    #[test]
    fn test_next_unpadded() {
        let mut seq = ChunkSequencer::new('_', false);
        let next = seq.next(&url("https://h/clip_007.ts")).unwrap();
        assert_eq!(next.uri.as_str(), "https://h/clip_8.ts");
        assert_eq!(seq.pad_width(), None);
    }

    #[test]
    fn test_next_preserves_query_and_directories() {
        let mut seq = ChunkSequencer::new('_', true);
        let next = seq
            .next(&url("https://h/seg_01/v_02/seg_09.ts?token=seg_09&x=1"))
            .unwrap();
        assert_eq!(
            next.uri.as_str(),
            "https://h/seg_01/v_02/seg_10.ts?token=seg_09&x=1"
        );
    }

    #[test]
    fn test_next_custom_separator() {
        let mut seq = ChunkSequencer::new('-', true);
        let next = seq.next(&url("https://h/media-v1-041.ts")).unwrap();
        assert_eq!(next.uri.as_str(), "https://h/media-v1-042.ts");
    }

    #[test]
    fn test_next_invalid_token() {
        let mut seq = ChunkSequencer::new('_', true);
        assert!(matches!(
            seq.next(&url("https://h/clip_abc.ts")),
            Err(SequenceError::InvalidChunkToken { .. })
        ));
        assert_eq!(seq.pad_width(), None);
    }

    #[test]
    fn test_independent_sequencers_agree() {
        let uri = url("https://h/clip_041.ts");
        let a = ChunkSequencer::new('_', true).next(&uri).unwrap();
        let b = ChunkSequencer::new('_', true).next(&uri).unwrap();
        assert_eq!(a, b);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_increment_adds_one(value in 0u64..10_000_000, width in 1usize..10) {
                let digits = format!("{:0width$}", value, width = width);
                let uri = url(&format!("https://h/p/clip_{}.ts", digits));

                let mut seq = ChunkSequencer::new('_', true);
                let next = seq.next(&uri).unwrap();
                let segment = last_segment(&next.uri).unwrap();
                let token = parse_segment(segment, '_').unwrap();

                prop_assert_eq!(token.value, value + 1);
                prop_assert_eq!(next.index, value + 1);

                let natural_len = (value + 1).to_string().len();
                if natural_len <= digits.len() {
                    prop_assert_eq!(token.digits.len(), digits.len());
                } else {
                    prop_assert_eq!(token.digits.len(), natural_len);
                }
            }

            #[test]
            fn test_replay_is_idempotent(value in 0u64..1_000_000, pad in any::<bool>()) {
                let uri = url(&format!("https://h/clip_{:04}.ts?q=1", value));
                let first = ChunkSequencer::new('_', pad).next(&uri).unwrap();
                let second = ChunkSequencer::new('_', pad).next(&uri).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
