//! Audio output hardware mode

use serde::Deserialize;

use crate::lenient::{self, reject_error_body};
use crate::{ApiError, WiimOperation};

/// `getNewAudioOutputHardwareMode`: which physical output is active
pub struct GetAudioOutputModeOperation;

/// Raw output-mode response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AudioOutputMode {
    /// Active output: `1` optical, `2` line out, `3` coax
    #[serde(default, deserialize_with = "lenient::string")]
    pub hardware: Option<String>,
    /// `1` when audio is sent to a Bluetooth sink
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub audiocast: Option<String>,
}

impl AudioOutputMode {
    pub fn hardware_mode(&self) -> Option<u8> {
        self.hardware.as_deref().and_then(|h| h.trim().parse().ok())
    }
}

impl WiimOperation for GetAudioOutputModeOperation {
    type Request = ();
    type Response = AudioOutputMode;

    const COMMAND: &'static str = "getNewAudioOutputHardwareMode";

    fn build_command(_request: &Self::Request) -> String {
        Self::COMMAND.to_string()
    }

    fn parse_response(body: &str) -> Result<Self::Response, ApiError> {
        let body = reject_error_body(body)?;
        let mode: AudioOutputMode = serde_json::from_str(body)?;
        if mode.hardware.is_none() {
            return Err(ApiError::Malformed(
                "output mode response has no hardware field".to_string(),
            ));
        }
        Ok(mode)
    }
}
