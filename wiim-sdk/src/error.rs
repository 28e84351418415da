use thiserror::Error;
use wiim_api::ApiError;

use crate::logging::LoggingError;

/// Top-level SDK error
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid device host: {0}")]
    InvalidHost(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Engine stopped")]
    EngineStopped,
}

/// Capability discovery could not build a capability set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// `getStatusEx` failed; without an identity there is no device
    #[error("Device identity unavailable: {0}")]
    Identity(ApiError),
}

impl DiscoveryError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            DiscoveryError::Identity(e) => e,
        }
    }
}

/// Why a host command did not (fully) take effect
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The device's capability set does not include what the command needs.
    /// Nothing was sent.
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Device is not connected")]
    NotConnected,

    /// The command waited in the queue longer than the command timeout
    #[error("Command expired before it could run")]
    Expired,

    #[error("Device error: {0}")]
    Device(#[from] ApiError),

    #[error("Engine stopped")]
    EngineStopped,
}

impl CommandError {
    /// Network-level failure, counted by the connection supervisor
    pub fn is_unreachable(&self) -> bool {
        matches!(self, CommandError::Device(e) if e.is_unreachable())
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_unreachable() {
        assert!(CommandError::Device(ApiError::Unreachable("timeout".into())).is_unreachable());
        assert!(!CommandError::Device(ApiError::DeviceRejected("Failed".into())).is_unreachable());
        assert!(!CommandError::NotConnected.is_unreachable());
    }

    #[test]
    fn test_error_display() {
        let err = CommandError::UnsupportedCapability("audio output switching".into());
        assert_eq!(err.to_string(), "Unsupported capability: audio output switching");

        let err = DiscoveryError::Identity(ApiError::Unreachable("connection refused".into()));
        assert!(err.to_string().contains("connection refused"));
        assert!(err.api_error().is_unreachable());
    }

    #[test]
    fn test_sdk_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(SdkError::from(json_err), SdkError::Json(_)));
    }
}
