//! Write commands
//!
//! Every state-changing call goes through [`SendCommandOperation`]; the
//! device acknowledges with a short plain-text body (usually `OK`) or a
//! small JSON object carrying a `status` field.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient::reject_error_body;
use crate::{ApiError, WiimOperation};

/// A single write call to the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceCommand {
    /// `setPlayerCmd:resume`
    Resume,
    /// `setPlayerCmd:pause`
    Pause,
    /// `setPlayerCmd:onepause`, toggles between play and pause
    TogglePlayPause,
    Stop,
    Next,
    Previous,
    /// Absolute volume, 0..=100
    SetVolume(u8),
    SetMute(bool),
    /// Raw loop mode, see `wiim_state::LoopMode`
    SetLoopMode(u8),
    /// Switch input, e.g. `line-in`, `bluetooth`, `wifi`
    SwitchSource(String),
    /// Activate preset slot 1..=12
    ActivatePreset(u8),
    EqOn,
    EqOff,
    EqLoad(String),
    /// Select output hardware: 1 optical, 2 line out, 3 coax
    SetOutputMode(u8),
    /// Front panel display on (`true`) or off
    SetDisplay(bool),
    Reboot,
}

impl DeviceCommand {
    /// Raw command text for `httpapi.asp?command=`
    pub fn to_command(&self) -> String {
        match self {
            DeviceCommand::Resume => "setPlayerCmd:resume".to_string(),
            DeviceCommand::Pause => "setPlayerCmd:pause".to_string(),
            DeviceCommand::TogglePlayPause => "setPlayerCmd:onepause".to_string(),
            DeviceCommand::Stop => "setPlayerCmd:stop".to_string(),
            DeviceCommand::Next => "setPlayerCmd:next".to_string(),
            DeviceCommand::Previous => "setPlayerCmd:prev".to_string(),
            DeviceCommand::SetVolume(level) => format!("setPlayerCmd:vol:{}", (*level).min(100)),
            DeviceCommand::SetMute(muted) => format!("setPlayerCmd:mute:{}", u8::from(*muted)),
            DeviceCommand::SetLoopMode(mode) => format!("setPlayerCmd:loopmode:{}", mode),
            DeviceCommand::SwitchSource(source) => format!("setPlayerCmd:switchmode:{}", source),
            DeviceCommand::ActivatePreset(slot) => format!("MCUKeyShortClick:{}", slot),
            DeviceCommand::EqOn => "EQOn".to_string(),
            DeviceCommand::EqOff => "EQOff".to_string(),
            DeviceCommand::EqLoad(name) => format!("EQLoad:{}", name),
            DeviceCommand::SetOutputMode(mode) => format!("setAudioOutputHardwareMode:{}", mode),
            DeviceCommand::SetDisplay(on) => format!(
                r#"setLightOperationBrightConfig:{{"disable":{}}}"#,
                u8::from(!*on)
            ),
            DeviceCommand::Reboot => "reboot".to_string(),
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command())
    }
}

/// Send one [`DeviceCommand`] and check the acknowledgement
pub struct SendCommandOperation;

impl WiimOperation for SendCommandOperation {
    type Request = DeviceCommand;
    type Response = ();

    const COMMAND: &'static str = "command";

    fn build_command(request: &Self::Request) -> String {
        request.to_command()
    }

    fn parse_response(body: &str) -> Result<Self::Response, ApiError> {
        let body = reject_error_body(body)?;

        // EQ commands answer {"status":"OK"} / {"status":"Failed"}
        if body.starts_with('{') {
            if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
                if let Some(status) = object.get("status").and_then(Value::as_str) {
                    reject_error_body(status)?;
                }
            }
        }

        Ok(())
    }
}
