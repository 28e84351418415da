//! Capability set: what one device instance supports for one epoch

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::service_key;

/// Who the device is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Stable id: uuid without dashes, else MAC without colons, else the host
    pub id: String,
    pub name: Option<String>,
    /// Model code (`project`, else `hardware`)
    pub model: Option<String>,
    pub firmware: Option<String>,
    pub uuid: Option<String>,
    pub mac: Option<String>,
}

/// Whether a source is a physical input or network playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceCategory {
    Physical,
    Streaming,
}

/// A selectable input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Id used by `switchmode`, e.g. `line-in`
    pub id: String,
    pub label: String,
    pub category: SourceCategory,
}

/// Music service implied by preset content
///
/// Unrecognized vendor identifiers stay distinct as [`ServiceLabel::Opaque`]
/// instead of being merged into a catch-all bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceLabel {
    /// Canonical label from the normalization table
    Known(String),
    /// Raw vendor identifier we have no mapping for
    Opaque(String),
}

impl ServiceLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceLabel::Known(label) | ServiceLabel::Opaque(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ServiceLabel::Known(_))
    }
}

impl fmt::Display for ServiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored preset slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetEntry {
    /// Slot number, 1..=12
    pub slot: u8,
    pub name: Option<String>,
    /// `None` when the content names no recognizable service
    pub service: Option<ServiceLabel>,
    /// The preset object exactly as the device reported it
    pub raw: serde_json::Value,
}

/// A selectable audio output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMode {
    /// Value for `setAudioOutputHardwareMode`
    pub id: u8,
    pub label: String,
}

/// The discovered, immutable description of one device for one epoch
///
/// A set is either complete or absent. It is never patched in place; the
/// next connection builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// Connection epoch this set belongs to
    pub epoch: u64,
    pub identity: DeviceIdentity,
    pub sources: Vec<SourceEntry>,
    /// Sorted by slot, one entry per slot
    pub presets: Vec<PresetEntry>,
    /// Distinct services, ordered by the lowest slot that implies them
    pub services: Vec<ServiceLabel>,
    /// Empty when the device has no EQ
    pub eq_presets: Vec<String>,
    /// Empty when the device cannot switch outputs
    pub outputs: Vec<OutputMode>,
}

impl CapabilitySet {
    pub fn new(
        epoch: u64,
        identity: DeviceIdentity,
        sources: Vec<SourceEntry>,
        mut presets: Vec<PresetEntry>,
        eq_presets: Vec<String>,
        outputs: Vec<OutputMode>,
    ) -> Self {
        presets.sort_by_key(|p| p.slot);
        presets.dedup_by_key(|p| p.slot);

        let mut services: Vec<ServiceLabel> = Vec::new();
        for service in presets.iter().filter_map(|p| p.service.as_ref()) {
            if !services.contains(service) {
                services.push(service.clone());
            }
        }

        Self {
            epoch,
            identity,
            sources,
            presets,
            services,
            eq_presets,
            outputs,
        }
    }

    pub fn has_eq(&self) -> bool {
        !self.eq_presets.is_empty()
    }

    pub fn supports_output_switching(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// Source by id, case-insensitive (`HDMI` and `hdmi` are the same input)
    pub fn source(&self, id: &str) -> Option<&SourceEntry> {
        self.sources.iter().find(|s| s.id.eq_ignore_ascii_case(id.trim()))
    }

    pub fn preset(&self, slot: u8) -> Option<&PresetEntry> {
        self.presets.iter().find(|p| p.slot == slot)
    }

    pub fn output(&self, id: u8) -> Option<&OutputMode> {
        self.outputs.iter().find(|o| o.id == id)
    }

    /// Lowest-numbered slot whose content implies `service`
    ///
    /// Matching ignores case, spaces and punctuation, so `"tidal"` finds
    /// `TIDAL`.
    pub fn preset_for_service(&self, service: &str) -> Option<u8> {
        let wanted = service_key(service);
        if wanted.is_empty() {
            return None;
        }
        self.presets
            .iter()
            .filter(|p| {
                p.service
                    .as_ref()
                    .is_some_and(|s| service_key(s.as_str()) == wanted)
            })
            .map(|p| p.slot)
            .min()
    }

    /// EQ preset name matching a loose key (`bass_booster` finds `Bass Booster`)
    pub fn eq_preset(&self, key: &str) -> Option<&str> {
        let wanted = service_key(key);
        self.eq_presets
            .iter()
            .find(|name| service_key(name) == wanted)
            .map(String::as_str)
    }
}
