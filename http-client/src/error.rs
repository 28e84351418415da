//! Error types for the HTTP client

use thiserror::Error;

/// Errors that can occur while talking to the device's command endpoint
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// Connect, DNS, read or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// The device answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response body could not be read as text
    #[error("Unreadable response body: {0}")]
    Body(String),

    /// The TLS connector could not be built
    #[error("TLS setup failed: {0}")]
    Tls(String),
}

impl HttpError {
    /// True when the device could not be reached at all
    pub fn is_network(&self) -> bool {
        matches!(self, HttpError::Network(_))
    }
}
