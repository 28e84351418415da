//! Preset slot listing

use serde::Deserialize;
use serde_json::Value;

use crate::lenient::{self, reject_error_body};
use crate::{ApiError, WiimOperation};

/// `getPresetInfo`: the device's stored preset slots
pub struct GetPresetInfoOperation;

/// One preset slot as reported by the device
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PresetSlot {
    /// Slot number, 1..=12
    #[serde(default, deserialize_with = "lenient::string")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: Option<String>,
    /// Vendor service identifier, e.g. `Spotify`, `Tidal`, `TuneIn`
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub picurl: Option<String>,
    /// The untouched JSON object for this slot
    #[serde(skip)]
    pub raw: Value,
}

impl PresetSlot {
    /// Parsed slot number, if it is a valid 1..=12 slot
    pub fn slot(&self) -> Option<u8> {
        self.number
            .as_deref()
            .and_then(|n| n.trim().parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
    }

    /// A slot is empty when it carries neither a name nor a URL
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.name) && blank(&self.url)
    }
}

/// Raw `getPresetInfo` response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetList {
    pub preset_num: Option<u32>,
    pub presets: Vec<PresetSlot>,
}

impl WiimOperation for GetPresetInfoOperation {
    type Request = ();
    type Response = PresetList;

    const COMMAND: &'static str = "getPresetInfo";

    fn build_command(_request: &Self::Request) -> String {
        Self::COMMAND.to_string()
    }

    fn parse_response(body: &str) -> Result<Self::Response, ApiError> {
        let body = reject_error_body(body)?;
        let value: Value = serde_json::from_str(body)?;

        let object = value
            .as_object()
            .ok_or_else(|| ApiError::Malformed("preset info is not an object".to_string()))?;

        let preset_num = object.get("preset_num").and_then(|n| match n {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        let mut presets = Vec::new();
        if let Some(list) = object.get("preset_list") {
            let items = list
                .as_array()
                .ok_or_else(|| ApiError::Malformed("preset_list is not an array".to_string()))?;
            for item in items {
                if !item.is_object() {
                    tracing::debug!("Skipping preset entry that is not an object: {}", item);
                    continue;
                }
                match serde_json::from_value::<PresetSlot>(item.clone()) {
                    Ok(mut slot) => {
                        slot.raw = item.clone();
                        presets.push(slot);
                    }
                    Err(e) => tracing::debug!("Skipping unreadable preset entry {}: {}", item, e),
                }
            }
        }

        Ok(PresetList { preset_num, presets })
    }
}
