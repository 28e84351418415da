//! Playback state enumeration

use serde::{Deserialize, Serialize};

/// Current playback state of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlaybackState {
    /// Currently playing audio (including buffering)
    Playing,
    /// Playback is paused
    Paused,
    /// Playback is stopped
    Stopped,
    /// The device reported something we do not recognize
    #[default]
    Unknown,
}

impl PlaybackState {
    /// Parse from the `status` field of `getPlayerStatus`
    ///
    /// Handles the values the firmware emits:
    /// - "play", "load", "loading"
    /// - "pause"
    /// - "stop", "none"
    pub fn from_device_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "play" | "playing" | "load" | "loading" => PlaybackState::Playing,
            "pause" | "paused" => PlaybackState::Paused,
            "stop" | "stopped" | "none" => PlaybackState::Stopped,
            _ => PlaybackState::Unknown,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}
