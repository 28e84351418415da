use http_client::HttpError;
use thiserror::Error;

/// Failure kinds of a single device call
///
/// Every gateway call resolves to a structured response or exactly one of
/// these. Callers decide what to do with them; the gateway never retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Network-level failure
    ///
    /// Connection refused, DNS failure, TLS failure or timeout. A timed-out
    /// call is indistinguishable from an unreachable device.
    #[error("Device unreachable: {0}")]
    Unreachable(String),

    /// Response could not be parsed as expected
    ///
    /// The device answered, but the body is not the JSON shape the command
    /// returns.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Device refused the command
    ///
    /// The device answered with `unknown command`, `Failed`, or a non-success
    /// HTTP status. These are never retried.
    #[error("Device rejected command: {0}")]
    DeviceRejected(String),
}

impl ApiError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::Malformed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ApiError::DeviceRejected(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<HttpError> for ApiError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Network(msg) | HttpError::Tls(msg) => ApiError::Unreachable(msg),
            HttpError::Status(code) => ApiError::DeviceRejected(format!("HTTP {}", code)),
            HttpError::Body(msg) => ApiError::Malformed(msg),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Malformed(error.to_string())
    }
}
