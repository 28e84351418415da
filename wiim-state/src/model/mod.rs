//! Data model types

mod attribute;
mod capability;
mod loop_mode;
mod playback_state;
mod snapshot;

pub use attribute::{Attribute, AttributeChange, DegradedField};
pub use capability::{
    CapabilitySet, DeviceIdentity, OutputMode, PresetEntry, ServiceLabel, SourceCategory,
    SourceEntry,
};
pub use loop_mode::{LoopMode, RepeatMode};
pub use playback_state::PlaybackState;
pub use snapshot::{DeviceSnapshot, NowPlaying};
