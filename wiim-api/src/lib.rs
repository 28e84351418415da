//! Type-safe access to the WiiM / LinkPlay HTTP command API
//!
//! WiiM streamers expose a single `httpapi.asp?command=...` endpoint. This
//! crate models each command as an operation with a typed request and a
//! typed, tolerant response, and classifies every failure as one of
//! [`ApiError::Unreachable`], [`ApiError::Malformed`] or
//! [`ApiError::DeviceRejected`].
//!
//! ```text
//! WiimClient::execute::<Op>()
//!     ↓ Op::build_command()
//! http_client::Transport (one GET, bounded timeout)
//!     ↓ Op::parse_response()
//! typed response
//! ```

mod client;
mod error;
mod lenient;
mod operation;
pub mod operations;

pub use client::WiimClient;
pub use error::{ApiError, Result};
pub use operation::WiimOperation;
pub use operations::{
    AudioOutputMode, DeviceCommand, DeviceStatus, MetaData, PlayerStatus, PresetList, PresetSlot,
};

pub use http_client::{HttpClient, HttpConfig, HttpError, Scheme, Transport};
