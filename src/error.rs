//! Error taxonomy for adapter steps.
//!
//! Every variant here is *internal*: the adapter pipeline downgrades any
//! [`ScrapeError`] to "contributed zero candidates" before results leave a
//! [`StreamProvider`](crate::stream::StreamProvider).

use thiserror::Error;

/// Failures raised while locating or extracting stream candidates.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("metadata lookup failed: {0}")]
    Metadata(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
