use thiserror::Error;

/// pricecmp error types
#[derive(Error, Debug)]
pub enum PriceCmpError {
    /// Network-level HTTP failure (connect, timeout, body read)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Failed to extract a value from a page or payload
    #[error("parse error: {0}")]
    Parse(String),

    /// Exchange rate lookup failed
    #[error("rate error: {0}")]
    Rate(String),
}

/// Result type alias for pricecmp
pub type Result<T> = std::result::Result<T, PriceCmpError>;
