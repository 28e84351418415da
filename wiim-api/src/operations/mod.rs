//! Device operations, grouped by what they touch

pub mod command;
pub mod eq;
pub mod output;
pub mod presets;
pub mod status;

pub use command::{DeviceCommand, SendCommandOperation};
pub use eq::EqGetListOperation;
pub use output::{AudioOutputMode, GetAudioOutputModeOperation};
pub use presets::{GetPresetInfoOperation, PresetList, PresetSlot};
pub use status::{
    DeviceStatus, GetMetaInfoOperation, GetPlayerStatusOperation, GetStatusExOperation, MetaData,
    PlayerStatus,
};
