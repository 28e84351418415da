//! Input sources: playback-mode decoding and capability inference

use wiim_api::DeviceStatus;

use crate::model::{DeviceIdentity, SourceCategory, SourceEntry};

/// Physical inputs: (`switchmode` id, label, `plm_support` bit)
const PHYSICAL_SOURCES: &[(&str, &str, u64)] = &[
    ("line-in", "Line In", 0x2),
    ("bluetooth", "Bluetooth", 0x4),
    ("udisk", "USB", 0x8),
    ("optical", "Optical", 0x10),
    ("co-axial", "Coaxial", 0x40),
    ("line-in2", "Line In 2", 0x100),
    ("HDMI", "HDMI", 0x400),
    ("phono", "Phono", 0x100000),
];

/// Inputs assumed when the device does not report `plm_support`
const DEFAULT_PHYSICAL: &[&str] = &["bluetooth", "line-in", "optical", "HDMI", "phono", "udisk"];

/// Source id for a `getPlayerStatus` playback mode
///
/// Network playback (AirPlay, DLNA, Spotify Connect, TIDAL Connect, ...)
/// all reports as `wifi`. Idle and unknown modes have no source.
pub fn source_for_mode(mode: u32) -> Option<&'static str> {
    match mode {
        1 | 2 | 10 | 16 | 31 | 32 | 50 | 99 => Some("wifi"),
        11 | 42 => Some("udisk"),
        40 => Some("line-in"),
        41 => Some("bluetooth"),
        43 => Some("optical"),
        44 => Some("co-axial"),
        47 => Some("line-in2"),
        49 => Some("HDMI"),
        54 => Some("phono"),
        _ => None,
    }
}

/// Human label for a source id
pub fn source_label(id: &str) -> String {
    if id.eq_ignore_ascii_case("wifi") {
        return "WiFi".to_string();
    }
    PHYSICAL_SOURCES
        .iter()
        .find(|(source, _, _)| source.eq_ignore_ascii_case(id))
        .map(|(_, label, _)| label.to_string())
        .unwrap_or_else(|| id.to_string())
}

fn streaming_source() -> SourceEntry {
    SourceEntry {
        id: "wifi".to_string(),
        label: source_label("wifi"),
        category: SourceCategory::Streaming,
    }
}

fn physical_source(id: &str, label: &str) -> SourceEntry {
    SourceEntry {
        id: id.to_string(),
        label: label.to_string(),
        category: SourceCategory::Physical,
    }
}

/// Parse `plm_support`, which arrives as `0x...` hex or plain decimal
fn parse_bitmask(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Sources a device offers, inferred from its `getStatusEx` response
///
/// `wifi` is always first. Physical inputs follow in table order, taken
/// from the `plm_support` bitmask when present and from the default set
/// otherwise.
pub fn sources_for_device(status: &DeviceStatus) -> Vec<SourceEntry> {
    let mut sources = vec![streaming_source()];

    match status.plm_support.as_deref().and_then(parse_bitmask) {
        Some(mask) => sources.extend(
            PHYSICAL_SOURCES
                .iter()
                .filter(|(_, _, bit)| mask & bit != 0)
                .map(|(id, label, _)| physical_source(id, label)),
        ),
        None => sources.extend(
            PHYSICAL_SOURCES
                .iter()
                .filter(|(id, _, _)| DEFAULT_PHYSICAL.contains(id))
                .map(|(id, label, _)| physical_source(id, label)),
        ),
    }

    sources
}

/// Device identity from `getStatusEx`
pub fn identity_for_device(status: &DeviceStatus, host: &str) -> DeviceIdentity {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let uuid = non_empty(&status.uuid);
    let mac = non_empty(&status.mac);
    let id = uuid
        .as_deref()
        .map(|u| u.replace('-', ""))
        .or_else(|| mac.as_deref().map(|m| m.replace(':', "")))
        .unwrap_or_else(|| host.to_string());

    DeviceIdentity {
        id,
        name: non_empty(&status.device_name),
        model: non_empty(&status.project).or_else(|| non_empty(&status.hardware)),
        firmware: non_empty(&status.firmware),
        uuid,
        mac,
    }
}
