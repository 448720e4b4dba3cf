//! Typed failures of the fetch and extraction layers.
//!
//! Application-level flows wrap these in `anyhow::Error`; the pagination loop
//! matches on them directly so a transport failure can end the run early
//! without escaping to the caller.

/// Errors raised while fetching pages or extracting listings
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Connection, timeout or body read failure
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A CSS selector could not be parsed
    #[error("Failed to parse selector '{selector}': {error}")]
    InvalidSelector { selector: String, error: String },

    /// A configured request header is not a valid HTTP header
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The politeness delay bounds are reversed
    #[error("Invalid delay range: min {min:?} is greater than max {max:?}")]
    InvalidDelay {
        min: std::time::Duration,
        max: std::time::Duration,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

