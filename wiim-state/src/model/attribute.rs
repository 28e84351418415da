//! Attribute change types pushed to the host

use serde::{Deserialize, Serialize};

use super::{PlaybackState, RepeatMode};

/// Host-facing attributes, declared in emission priority order
///
/// Playback status comes first, then progress, then metadata, then
/// volume/mute, then everything else. The derived `Ord` is that priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    PlaybackStatus,
    Position,
    Duration,
    Title,
    Artist,
    Album,
    Artwork,
    Volume,
    Muted,
    Repeat,
    Shuffle,
    Source,
    AudioOutput,
}

impl Attribute {
    /// Stable lowercase name, used in logs and degraded-data events
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::PlaybackStatus => "playback_status",
            Attribute::Position => "position",
            Attribute::Duration => "duration",
            Attribute::Title => "title",
            Attribute::Artist => "artist",
            Attribute::Album => "album",
            Attribute::Artwork => "artwork",
            Attribute::Volume => "volume",
            Attribute::Muted => "muted",
            Attribute::Repeat => "repeat",
            Attribute::Shuffle => "shuffle",
            Attribute::Source => "source",
            Attribute::AudioOutput => "audio_output",
        }
    }
}

/// One attribute that changed, carrying its new value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeChange {
    PlaybackStatus(PlaybackState),
    Position(Option<u64>),
    Duration(Option<u64>),
    Title(Option<String>),
    Artist(Option<String>),
    Album(Option<String>),
    Artwork(Option<String>),
    Volume(u8),
    Muted(bool),
    Repeat(RepeatMode),
    Shuffle(bool),
    Source(Option<String>),
    AudioOutput(Option<u8>),
}

impl AttributeChange {
    /// The attribute this change applies to
    pub fn attribute(&self) -> Attribute {
        match self {
            AttributeChange::PlaybackStatus(_) => Attribute::PlaybackStatus,
            AttributeChange::Position(_) => Attribute::Position,
            AttributeChange::Duration(_) => Attribute::Duration,
            AttributeChange::Title(_) => Attribute::Title,
            AttributeChange::Artist(_) => Attribute::Artist,
            AttributeChange::Album(_) => Attribute::Album,
            AttributeChange::Artwork(_) => Attribute::Artwork,
            AttributeChange::Volume(_) => Attribute::Volume,
            AttributeChange::Muted(_) => Attribute::Muted,
            AttributeChange::Repeat(_) => Attribute::Repeat,
            AttributeChange::Shuffle(_) => Attribute::Shuffle,
            AttributeChange::Source(_) => Attribute::Source,
            AttributeChange::AudioOutput(_) => Attribute::AudioOutput,
        }
    }
}

/// A field whose raw value could not be used this tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedField {
    pub attribute: Attribute,
    pub reason: String,
}
