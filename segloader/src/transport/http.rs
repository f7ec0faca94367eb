//! `reqwest`-backed chunk transport.

use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};

use super::types::{BoxFuture, ChunkBody, ChunkTransport, TransportError};
use crate::config::DownloaderConfig;

/// How a non-success status should be treated.
///
/// 404 is the end-of-resource signal. 408, 429 and 5xx are worth retrying;
/// other client errors are not.
pub fn classify_status(url: &str, status: StatusCode) -> Option<TransportError> {
    if status.is_success() {
        return None;
    }

    let reason = format!("HTTP {}", status);
    let err = if status == StatusCode::NOT_FOUND {
        TransportError::NotFound {
            url: url.to_string(),
        }
    } else if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        TransportError::transient(url, reason)
    } else {
        TransportError::fatal(url, reason)
    };
    Some(err)
}

fn classify_request_error(url: &str, err: &reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::fatal(url, format!("invalid request: {}", err))
    } else if err.is_timeout() {
        TransportError::transient(url, format!("timed out: {}", err))
    } else {
        TransportError::transient(url, err.to_string())
    }
}

/// Chunk transport over an async `reqwest` client.
///
/// The client is shared by every chunk of every job using this transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport from downloader settings.
    pub fn new(config: &DownloaderConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                TransportError::fatal("", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            timeout: config.request_timeout,
        })
    }

    /// Per-request timeout in use.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ChunkTransport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ChunkBody, TransportError>> {
        Box::pin(async move {
            tracing::debug!(url, "GET chunk");

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| classify_request_error(url, &e))?;

            if let Some(err) = classify_status(url, response.status()) {
                return Err(err);
            }

            let owned_url = url.to_string();
            let body = response
                .bytes_stream()
                .map_err(move |e| TransportError::transient(owned_url.clone(), e.to_string()))
                .boxed();

            Ok(body)
        })
    }
}
