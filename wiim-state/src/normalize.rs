//! Normalization of raw device responses into snapshots
//!
//! Raw responses carry strings for everything, placeholders for unknown
//! metadata, hex-encoded fallbacks and the occasional garbage value. This
//! module turns them into a typed [`DeviceSnapshot`]. A field that cannot
//! be coerced keeps its previous value and is reported as degraded.

use wiim_api::{AudioOutputMode, MetaData, PlayerStatus};

use crate::model::{
    Attribute, DegradedField, DeviceSnapshot, LoopMode, NowPlaying, PlaybackState,
};
use crate::sources::source_for_mode;

/// Sentinel strings the firmware uses for "unknown"
const PLACEHOLDERS: &[&str] = &["unknow", "un_known", "unknown", "null", "none", ""];

/// Trim and drop placeholder values
pub fn clean_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if PLACEHOLDERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Clamp any integer into the 0..=100 volume range
pub fn clamp_volume(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Decode the hex-encoded UTF-8 text used by `getPlayerStatus` metadata
pub fn decode_hex_text(encoded: &str) -> Option<String> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return None;
    }
    hex::decode(encoded).ok().and_then(|bytes| String::from_utf8(bytes).ok())
}

fn hex_field(raw: Option<&str>) -> Option<String> {
    let text = decode_hex_text(raw?)?;
    clean_text(Some(&text))
}

/// Normalization switches
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// A stopped device reports no metadata or progress
    pub clear_metadata_on_stop: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            clear_metadata_on_stop: true,
        }
    }
}

/// Raw inputs for one tick; `None` means "keep what we had"
#[derive(Debug, Clone, Default)]
pub struct RawReading {
    pub status: Option<PlayerStatus>,
    pub meta: Option<MetaData>,
    pub output: Option<AudioOutputMode>,
}

/// Result of normalizing one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub snapshot: DeviceSnapshot,
    pub degraded: Vec<DegradedField>,
}

/// Accumulates a snapshot field by field
struct Builder {
    snapshot: DeviceSnapshot,
    degraded: Vec<DegradedField>,
}

impl Builder {
    fn degrade(&mut self, attribute: Attribute, raw: &str) {
        self.degraded.push(DegradedField {
            attribute,
            reason: format!("unusable value {:?}", raw),
        });
    }

    /// Parse a numeric field; on failure record it as degraded and return None
    fn number<T: std::str::FromStr>(&mut self, attribute: Attribute, raw: Option<&str>) -> Option<T> {
        let raw = raw?;
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.degrade(attribute, raw);
                None
            }
        }
    }

    fn apply_status(&mut self, status: &PlayerStatus) {
        if let Some(raw) = status.status.as_deref() {
            self.snapshot.playback = PlaybackState::from_device_status(raw);
        }

        if let Some(volume) = self.number::<i64>(Attribute::Volume, status.vol.as_deref()) {
            self.snapshot.volume = clamp_volume(volume);
        }

        if let Some(raw) = status.mute.as_deref() {
            match raw.trim() {
                "1" | "true" => self.snapshot.muted = true,
                "0" | "false" => self.snapshot.muted = false,
                other => self.degrade(Attribute::Muted, other),
            }
        }

        if let Some(code) = self.number::<u8>(Attribute::Repeat, status.loop_mode.as_deref()) {
            let mode = LoopMode::from_code(code);
            self.snapshot.repeat = mode.repeat;
            self.snapshot.shuffle = mode.shuffle;
        }

        if let Some(mode) = self.number::<u32>(Attribute::Source, status.mode.as_deref()) {
            self.snapshot.source = source_for_mode(mode).map(str::to_string);
        }

        let duration = self.number::<u64>(Attribute::Duration, status.totlen.as_deref());
        let position = self.number::<u64>(Attribute::Position, status.curpos.as_deref());
        match duration {
            Some(0) => {
                self.snapshot.duration_secs = None;
                self.snapshot.position_secs = None;
            }
            Some(total_ms) => {
                self.snapshot.duration_secs = Some(total_ms / 1000);
                if let Some(pos_ms) = position {
                    self.snapshot.position_secs = Some(pos_ms.min(total_ms) / 1000);
                }
            }
            None => {}
        }
    }

    fn apply_metadata(&mut self, meta: &MetaData, status: Option<&PlayerStatus>) {
        let title_hex = status.and_then(|s| s.title_hex.as_deref());
        let artist_hex = status.and_then(|s| s.artist_hex.as_deref());
        let album_hex = status.and_then(|s| s.album_hex.as_deref());

        self.snapshot.now_playing = NowPlaying {
            title: clean_text(meta.title.as_deref()).or_else(|| hex_field(title_hex)),
            artist: clean_text(meta.artist.as_deref()).or_else(|| hex_field(artist_hex)),
            album: clean_text(meta.album.as_deref()).or_else(|| hex_field(album_hex)),
            artwork: clean_text(meta.album_art_uri.as_deref()),
        };
    }

    fn apply_output(&mut self, output: &AudioOutputMode) {
        match output.hardware_mode() {
            Some(mode) => self.snapshot.output = Some(mode),
            None => {
                let raw = output.hardware.clone().unwrap_or_default();
                self.degrade(Attribute::AudioOutput, &raw);
            }
        }
    }
}

/// Build the next snapshot from one tick's raw responses
///
/// Fields whose response is missing from `reading`, or whose value cannot be
/// coerced, keep their value from `previous` (or the default when there is
/// no previous snapshot).
pub fn normalize(
    previous: Option<&DeviceSnapshot>,
    reading: &RawReading,
    options: NormalizeOptions,
) -> Normalized {
    let mut builder = Builder {
        snapshot: previous.cloned().unwrap_or_default(),
        degraded: Vec::new(),
    };

    if let Some(status) = &reading.status {
        builder.apply_status(status);
    }

    let source_changed = previous.is_some_and(|p| p.source != builder.snapshot.source);
    match &reading.meta {
        Some(meta) => builder.apply_metadata(meta, reading.status.as_ref()),
        // Metadata from another input is never carried over
        None if source_changed => builder.snapshot.now_playing = NowPlaying::default(),
        None => {}
    }

    if let Some(output) = &reading.output {
        builder.apply_output(output);
    }

    if options.clear_metadata_on_stop && builder.snapshot.playback == PlaybackState::Stopped {
        builder.snapshot.now_playing = NowPlaying::default();
        builder.snapshot.position_secs = None;
        builder.snapshot.duration_secs = None;
    }

    Normalized {
        snapshot: builder.snapshot.filter_placeholders(),
        degraded: builder.degraded,
    }
}
