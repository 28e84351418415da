//! Service normalization table
//!
//! Presets are the only evidence of which music services a device is set up
//! for. Each preset carries a vendor `source` string (`Spotify`, `Tidal`,
//! `newTuneIn`, ...) and a content URL. This module maps those to canonical
//! service labels.

use wiim_api::PresetSlot;

use crate::model::{PresetEntry, ServiceLabel};

/// Vendor identifiers (as keys) and the canonical label they map to
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("spotify", "Spotify"),
    ("spotifyconnect", "Spotify"),
    ("tidal", "TIDAL"),
    ("tidalconnect", "TIDAL"),
    ("qobuz", "Qobuz"),
    ("amazon", "Amazon Music"),
    ("amazonmusic", "Amazon Music"),
    ("primemusic", "Amazon Music"),
    ("deezer", "Deezer"),
    ("tunein", "TuneIn"),
    ("newtunein", "TuneIn"),
    ("iheartradio", "iHeartRadio"),
    ("iheart", "iHeartRadio"),
    ("pandora", "Pandora"),
    ("soundcloud", "SoundCloud"),
    ("napster", "Napster"),
    ("applemusic", "Apple Music"),
    ("youtubemusic", "YouTube Music"),
    ("radioparadise", "Radio Paradise"),
    ("vtuner", "vTuner"),
    ("calmradio", "Calm Radio"),
    ("soundmachine", "Sound Machine"),
    ("localmusic", "Local Music"),
    ("udisk", "Local Music"),
    ("dlna", "DLNA"),
    ("upnpserver", "DLNA"),
    ("airplay", "AirPlay"),
];

/// Identifiers that say nothing about the service behind the content
const GENERIC_TAGS: &[&str] = &["", "url", "http", "https", "unknown", "unknow", "none", "null"];

/// URL fragments that identify a service when the source tag is missing
const BUILTIN_URL_HINTS: &[(&str, &str)] = &[
    ("spotify:", "Spotify"),
    ("open.spotify.com", "Spotify"),
    ("tidal:", "TIDAL"),
    ("tidal.com", "TIDAL"),
    ("qobuz.com", "Qobuz"),
    ("deezer.com", "Deezer"),
    ("tunein.com", "TuneIn"),
    ("radiotime.com", "TuneIn"),
    ("iheart.com", "iHeartRadio"),
    ("pandora.com", "Pandora"),
    ("soundcloud.com", "SoundCloud"),
    ("music.amazon", "Amazon Music"),
    ("radioparadise.com", "Radio Paradise"),
];

/// Comparison key: lowercase ASCII alphanumerics only
///
/// `"new TuneIn"`, `"new_tunein"` and `"NewTuneIn"` share the key `newtunein`.
pub fn service_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Extensible mapping from raw vendor identifiers to canonical labels
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    aliases: Vec<(String, String)>,
    url_hints: Vec<(String, String)>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ServiceCatalog {
    /// Catalog with the built-in table
    pub fn builtin() -> Self {
        Self {
            aliases: BUILTIN_ALIASES
                .iter()
                .map(|(key, label)| (key.to_string(), label.to_string()))
                .collect(),
            url_hints: BUILTIN_URL_HINTS
                .iter()
                .map(|(needle, label)| (needle.to_string(), label.to_string()))
                .collect(),
        }
    }

    /// Add or override a vendor identifier mapping
    pub fn with_alias(mut self, raw: &str, canonical: &str) -> Self {
        let key = service_key(raw);
        self.aliases.retain(|(k, _)| *k != key);
        self.aliases.push((key, canonical.to_string()));
        self
    }

    /// Add a URL fragment that identifies a service
    pub fn with_url_hint(mut self, needle: &str, canonical: &str) -> Self {
        self.url_hints
            .push((needle.to_ascii_lowercase(), canonical.to_string()));
        self
    }

    /// Normalize a vendor identifier
    ///
    /// Known identifiers map to their canonical label, generic tags such as
    /// `URL` resolve to `None`, and anything else becomes an opaque label
    /// that keeps the raw text.
    pub fn normalize(&self, raw: &str) -> Option<ServiceLabel> {
        let key = service_key(raw);
        if GENERIC_TAGS.contains(&key.as_str()) {
            return None;
        }
        match self.aliases.iter().find(|(k, _)| *k == key) {
            Some((_, label)) => Some(ServiceLabel::Known(label.clone())),
            None => Some(ServiceLabel::Opaque(raw.trim().to_string())),
        }
    }

    /// Infer a service from a content URL
    pub fn infer_from_url(&self, url: &str) -> Option<ServiceLabel> {
        let lowered = url.to_ascii_lowercase();
        self.url_hints
            .iter()
            .find(|(needle, _)| lowered.contains(needle.as_str()))
            .map(|(_, label)| ServiceLabel::Known(label.clone()))
    }

    /// Service implied by a preset's source tag, falling back to its URL
    pub fn resolve(&self, source: Option<&str>, url: Option<&str>) -> Option<ServiceLabel> {
        source
            .and_then(|s| self.normalize(s))
            .or_else(|| url.and_then(|u| self.infer_from_url(u)))
    }

    /// Build preset entries from the raw slot list
    ///
    /// Empty slots and slots outside 1..=12 are skipped.
    pub fn preset_entries(&self, slots: &[PresetSlot]) -> Vec<PresetEntry> {
        slots
            .iter()
            .filter(|slot| !slot.is_empty())
            .filter_map(|slot| {
                let number = slot.slot()?;
                Some(PresetEntry {
                    slot: number,
                    name: slot
                        .name
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string),
                    service: self.resolve(slot.source.as_deref(), slot.url.as_deref()),
                    raw: slot.raw.clone(),
                })
            })
            .collect()
    }
}
