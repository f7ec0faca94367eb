//! HTTP transport for fetching chunk bodies.
//!
//! The transfer loop only needs one capability: open a GET for a chunk URI and
//! read its body as a byte stream. [`ChunkTransport`] captures that, and its
//! error type tells the loop whether a failure means "no such chunk",
//! "try again" or "give up", so no inspection of client-specific errors is
//! needed upstream.
//!
//! - [`ReqwestTransport`]: production implementation over `reqwest`
//! - Tests provide scripted in-memory implementations

mod http;
mod types;

pub use http::{classify_status, ReqwestTransport};
pub use types::{BoxFuture, ChunkBody, ChunkTransport, TransportError};
