//! Status reads: device identity, player status and track metadata

use serde::Deserialize;

use crate::lenient::{self, reject_error_body};
use crate::{ApiError, WiimOperation};

/// `getStatusEx`: device identity and hardware information
pub struct GetStatusExOperation;

/// Raw `getStatusEx` response
///
/// Only the fields the engine consumes are kept; everything else the
/// firmware adds is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceStatus {
    #[serde(rename = "DeviceName", default, deserialize_with = "lenient::string")]
    pub device_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uuid: Option<String>,
    /// Model code, e.g. `WiiM_Pro_with_gc4a`
    #[serde(default, deserialize_with = "lenient::string")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub hardware: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub firmware: Option<String>,
    #[serde(rename = "MAC", default, deserialize_with = "lenient::string")]
    pub mac: Option<String>,
    /// Hex bitmask of the physical inputs, e.g. `0x40016`
    #[serde(default, deserialize_with = "lenient::string")]
    pub plm_support: Option<String>,
}

impl WiimOperation for GetStatusExOperation {
    type Request = ();
    type Response = DeviceStatus;

    const COMMAND: &'static str = "getStatusEx";

    fn build_command(_request: &Self::Request) -> String {
        Self::COMMAND.to_string()
    }

    fn parse_response(body: &str) -> Result<Self::Response, ApiError> {
        let body = reject_error_body(body)?;
        Ok(serde_json::from_str(body)?)
    }
}

/// `getPlayerStatus`: playback status, volume, loop mode and position
pub struct GetPlayerStatusOperation;

/// Raw `getPlayerStatus` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerStatus {
    /// `play`, `pause`, `stop`, `load`, `loading` or `none`
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    /// Playback mode code, see the source mapping in `wiim-state`
    #[serde(default, deserialize_with = "lenient::string")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub vol: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mute: Option<String>,
    #[serde(rename = "loop", default, deserialize_with = "lenient::string")]
    pub loop_mode: Option<String>,
    /// Position in milliseconds
    #[serde(default, deserialize_with = "lenient::string")]
    pub curpos: Option<String>,
    /// Duration in milliseconds, `0` for live streams
    #[serde(default, deserialize_with = "lenient::string")]
    pub totlen: Option<String>,
    /// Hex-encoded UTF-8 title
    #[serde(rename = "Title", default, deserialize_with = "lenient::string")]
    pub title_hex: Option<String>,
    #[serde(rename = "Artist", default, deserialize_with = "lenient::string")]
    pub artist_hex: Option<String>,
    #[serde(rename = "Album", default, deserialize_with = "lenient::string")]
    pub album_hex: Option<String>,
}

impl WiimOperation for GetPlayerStatusOperation {
    type Request = ();
    type Response = PlayerStatus;

    const COMMAND: &'static str = "getPlayerStatus";

    fn build_command(_request: &Self::Request) -> String {
        Self::COMMAND.to_string()
    }

    fn parse_response(body: &str) -> Result<Self::Response, ApiError> {
        let body = reject_error_body(body)?;
        Ok(serde_json::from_str(body)?)
    }
}

/// `getMetaInfo`: now-playing metadata
pub struct GetMetaInfoOperation;

#[derive(Debug, Clone, Default, Deserialize)]
struct MetaInfoEnvelope {
    #[serde(rename = "metaData", default)]
    meta_data: Option<MetaData>,
}

/// Raw track metadata from `getMetaInfo`
///
/// Fields may hold placeholders such as `unknow` or `un_known`; those are
/// filtered during normalization, not here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetaData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub album: Option<String>,
    #[serde(rename = "albumArtURI", default, deserialize_with = "lenient::string")]
    pub album_art_uri: Option<String>,
    #[serde(rename = "sampleRate", default, deserialize_with = "lenient::string")]
    pub sample_rate: Option<String>,
    #[serde(rename = "bitDepth", default, deserialize_with = "lenient::string")]
    pub bit_depth: Option<String>,
}

impl WiimOperation for GetMetaInfoOperation {
    type Request = ();
    type Response = MetaData;

    const COMMAND: &'static str = "getMetaInfo";

    fn build_command(_request: &Self::Request) -> String {
        Self::COMMAND.to_string()
    }

    fn parse_response(body: &str) -> Result<Self::Response, ApiError> {
        let body = reject_error_body(body)?;
        let envelope: MetaInfoEnvelope = serde_json::from_str(body)?;
        Ok(envelope.meta_data.unwrap_or_default())
    }
}
