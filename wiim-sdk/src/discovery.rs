//! Capability discovery
//!
//! The device has no "list capabilities" call. Discovery probes identity,
//! presets, EQ and outputs, infers the rest, and builds a complete
//! [`CapabilitySet`] for one connection epoch.

use wiim_api::{Transport, WiimClient};
use wiim_state::{
    identity_for_device, sources_for_device, CapabilitySet, OutputMode, PresetEntry,
    ServiceCatalog,
};

use crate::error::DiscoveryError;

/// Output hardware modes accepted by `setAudioOutputHardwareMode`
const OUTPUT_MODES: &[(u8, &str)] = &[(1, "Optical Out"), (2, "Line Out"), (3, "Coax Out")];

/// Selectable outputs, in mode order
pub fn output_modes() -> Vec<OutputMode> {
    OUTPUT_MODES
        .iter()
        .map(|(id, label)| OutputMode {
            id: *id,
            label: label.to_string(),
        })
        .collect()
}

/// Build the capability set for a new epoch
///
/// Only the identity probe is fatal. Preset, EQ and output probes that fail
/// leave their part of the set empty.
pub fn discover<T: Transport>(
    client: &WiimClient<T>,
    host: &str,
    epoch: u64,
    catalog: &ServiceCatalog,
) -> Result<CapabilitySet, DiscoveryError> {
    let status = client.device_status().map_err(|e| {
        tracing::error!("Identity probe for {} failed: {}", host, e);
        DiscoveryError::Identity(e)
    })?;

    let identity = identity_for_device(&status, host);
    let sources = sources_for_device(&status);

    let presets: Vec<PresetEntry> = match client.preset_info() {
        Ok(list) => catalog.preset_entries(&list.presets),
        Err(e) => {
            tracing::warn!("Preset probe failed, no presets this epoch: {}", e);
            Vec::new()
        }
    };

    let eq_presets = match client.eq_list() {
        Ok(names) => names,
        Err(e) => {
            tracing::debug!("EQ probe failed, treating EQ as absent: {}", e);
            Vec::new()
        }
    };

    let outputs = match client.audio_output_mode() {
        Ok(mode) => {
            tracing::debug!("Active output mode {:?}", mode.hardware_mode());
            output_modes()
        }
        Err(e) => {
            tracing::debug!("Output probe failed, output switching unsupported: {}", e);
            Vec::new()
        }
    };

    let capabilities = CapabilitySet::new(epoch, identity, sources, presets, eq_presets, outputs);

    tracing::info!(
        "Discovered {} ({}) epoch {}: {} sources, {} presets, services [{}], {} EQ presets, {} outputs",
        capabilities.identity.name.as_deref().unwrap_or("unnamed device"),
        capabilities.identity.id,
        epoch,
        capabilities.sources.len(),
        capabilities.presets.len(),
        capabilities
            .services
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        capabilities.eq_presets.len(),
        capabilities.outputs.len(),
    );

    Ok(capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_modes_table() {
        let modes = output_modes();
        assert_eq!(modes.len(), 3);
        assert_eq!(modes[0].id, 1);
        assert_eq!(modes[1].label, "Line Out");
    }
}
