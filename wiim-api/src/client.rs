use http_client::{HttpClient, HttpConfig, Transport};

use crate::operations::{
    AudioOutputMode, DeviceCommand, DeviceStatus, EqGetListOperation, GetAudioOutputModeOperation,
    GetMetaInfoOperation, GetPlayerStatusOperation, GetPresetInfoOperation, GetStatusExOperation,
    MetaData, PlayerStatus, PresetList, SendCommandOperation,
};
use crate::{ApiError, Result, WiimOperation};

/// A client for executing WiiM operations against one device
///
/// This is the device gateway: each [`WiimClient::execute`] call renders one
/// command, performs exactly one request through the transport and parses
/// the body. There is no retry and no state beyond the transport itself.
///
/// ```rust,no_run
/// use wiim_api::{DeviceCommand, HttpConfig, Scheme, WiimClient};
///
/// let client = WiimClient::connect(HttpConfig::new(Scheme::Https, "192.168.1.40"))?;
/// let status = client.player_status()?;
/// println!("volume: {:?}", status.vol);
/// client.send(&DeviceCommand::SetVolume(30))?;
/// # Ok::<(), wiim_api::ApiError>(())
/// ```
#[derive(Debug)]
pub struct WiimClient<T = HttpClient> {
    transport: T,
}

impl WiimClient<HttpClient> {
    /// Create a client backed by the HTTP transport
    pub fn connect(config: HttpConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpClient::new(config)?))
    }
}

impl<T: Transport> WiimClient<T> {
    /// Create a client with a custom transport
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute an operation against the device
    ///
    /// Network failures surface as [`ApiError::Unreachable`], unexpected
    /// bodies as [`ApiError::Malformed`] and refusals as
    /// [`ApiError::DeviceRejected`].
    pub fn execute<Op: WiimOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        let command = Op::build_command(request);

        let body = self.transport.request(&command).map_err(|e| {
            tracing::debug!("{} failed: {}", command, e);
            ApiError::from(e)
        })?;

        Op::parse_response(&body).map_err(|e| {
            tracing::debug!("{} returned unusable body: {}", Op::COMMAND, e);
            e
        })
    }

    /// Send a write command
    pub fn send(&self, command: &DeviceCommand) -> Result<()> {
        self.execute::<SendCommandOperation>(command)
    }

    pub fn device_status(&self) -> Result<DeviceStatus> {
        self.execute::<GetStatusExOperation>(&())
    }

    pub fn player_status(&self) -> Result<PlayerStatus> {
        self.execute::<GetPlayerStatusOperation>(&())
    }

    pub fn meta_info(&self) -> Result<MetaData> {
        self.execute::<GetMetaInfoOperation>(&())
    }

    pub fn preset_info(&self) -> Result<PresetList> {
        self.execute::<GetPresetInfoOperation>(&())
    }

    pub fn eq_list(&self) -> Result<Vec<String>> {
        self.execute::<EqGetListOperation>(&())
    }

    pub fn audio_output_mode(&self) -> Result<AudioOutputMode> {
        self.execute::<GetAudioOutputModeOperation>(&())
    }
}
