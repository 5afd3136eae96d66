//! Error types for copilens-core

use thiserror::Error;

/// Main error type for the copilens-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch or decode failure at the provider boundary
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a provider call failed.
///
/// Every variant carries a human-readable cause suitable for a single
/// session-level error banner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never produced a response (DNS, TLS, timeout, refused).
    #[error("network failure: {0}")]
    Network(String),

    /// The upstream answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl Error {
    /// Returns the provider failure, if this error came from the provider boundary.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Error::Provider(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for copilens-core
pub type Result<T> = std::result::Result<T, Error>;
