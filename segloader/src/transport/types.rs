//! Transport trait and error kinds.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Streaming body of a single chunk.
///
/// Errors raised while the body is being read are reported through the
/// stream items and use the same [`TransportError`] classification.
pub type ChunkBody = BoxStream<'static, Result<Bytes, TransportError>>;

/// Failure kinds a transport reports to the transfer loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered 404 for this chunk.
    #[error("chunk not found: {url}")]
    NotFound { url: String },

    /// Connection failure, timeout, server error or broken body. Retryable.
    #[error("transient failure fetching {url}: {reason}")]
    Transient { url: String, reason: String },

    /// A failure that will not go away by asking again.
    #[error("request to {url} failed: {reason}")]
    Fatal { url: String, reason: String },
}

impl TransportError {
    /// Create a transient error.
    pub fn transient(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transient {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a fatal error.
    pub fn fatal(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fatal {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is the not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            Self::NotFound { url } | Self::Transient { url, .. } | Self::Fatal { url, .. } => url,
        }
    }
}

/// Fetches chunk bodies by URL.
///
/// # Dyn Compatibility
///
/// The method returns a [`BoxFuture`] so downloaders can hold an
/// `Arc<dyn ChunkTransport>` and tests can swap in scripted transports.
pub trait ChunkTransport: Send + Sync {
    /// Issue a GET for `url` and return its body as a stream.
    ///
    /// # Errors
    ///
    /// - [`TransportError::NotFound`] for a 404 response
    /// - [`TransportError::Transient`] for failures worth retrying
    /// - [`TransportError::Fatal`] for everything else
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ChunkBody, TransportError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let not_found = TransportError::NotFound {
            url: "http://h/a_1.ts".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());

        let transient = TransportError::transient("http://h/a_1.ts", "connection reset");
        assert!(transient.is_transient());
        assert_eq!(transient.url(), "http://h/a_1.ts");

        let fatal = TransportError::fatal("http://h/a_1.ts", "HTTP 403 Forbidden");
        assert!(!fatal.is_transient());
        assert!(!fatal.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::transient("http://h/a_1.ts", "timed out");
        assert_eq!(
            err.to_string(),
            "transient failure fetching http://h/a_1.ts: timed out"
        );
    }
}
