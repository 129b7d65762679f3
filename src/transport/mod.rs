//! Outbound HTTP plumbing shared by every provider adapter.

pub mod http;

pub use http::{HttpTransport, RawResponse};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
