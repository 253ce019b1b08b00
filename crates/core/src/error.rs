//! Error types for the hauler pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the hauler pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot download error.
    #[error("Download error: {0}")]
    Download(String),

    /// Snapshot cache error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// No market order data could be acquired from any source. This is the
    /// one hard failure of the pipeline; empty-but-valid results are not
    /// errors.
    #[error("no market order data available from any source")]
    NoMarketData,

    /// CSV parsing or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a download error.
    pub fn download(msg: impl Into<String>) -> Self {
        Error::Download(msg.into())
    }

    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Error::Cache(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
