//! Device state snapshot

use serde::{Deserialize, Serialize};

use super::{PlaybackState, RepeatMode};
use crate::normalize::{clamp_volume, clean_text};

/// Now-playing metadata; every field is independently nullable
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Album art URL
    pub artwork: Option<String>,
}

impl NowPlaying {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none() && self.artwork.is_none()
    }
}

/// Complete, normalized point-in-time description of the device
///
/// Snapshots are plain values: two snapshots are equal when every field is
/// equal. One is produced per poll tick and only the previous one is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub playback: PlaybackState,
    /// Position in whole seconds, `None` for live streams
    pub position_secs: Option<u64>,
    /// Duration in whole seconds, `None` for live streams
    pub duration_secs: Option<u64>,
    pub now_playing: NowPlaying,
    /// Volume, 0..=100
    pub volume: u8,
    pub muted: bool,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    /// Active source id, e.g. `wifi`, `line-in`
    pub source: Option<String>,
    /// Active audio output mode id
    pub output: Option<u8>,
}

impl DeviceSnapshot {
    /// Apply placeholder filtering and range clamping
    ///
    /// Idempotent: filtering an already filtered snapshot is a no-op.
    pub fn filter_placeholders(mut self) -> Self {
        self.now_playing.title = clean_text(self.now_playing.title.as_deref());
        self.now_playing.artist = clean_text(self.now_playing.artist.as_deref());
        self.now_playing.album = clean_text(self.now_playing.album.as_deref());
        self.now_playing.artwork = clean_text(self.now_playing.artwork.as_deref());
        self.source = clean_text(self.source.as_deref());
        self.volume = clamp_volume(i64::from(self.volume));
        self
    }
}
