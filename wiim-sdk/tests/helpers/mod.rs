//! Scripted in-memory transport for driving the engine without a network

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use wiim_api::{HttpError, Transport};
use wiim_sdk::EngineConfig;

/// Read commands; everything else is treated as a write
const READS: &[&str] = &[
    "getStatusEx",
    "getPlayerStatus",
    "getMetaInfo",
    "getPresetInfo",
    "EQGetList",
    "getNewAudioOutputHardwareMode",
];

pub const STATUS_EX: &str = r#"{
    "DeviceName": "Living Room",
    "uuid": "FF970016-A6FE-22C2-1234",
    "project": "WiiM_Pro_with_gc4a",
    "firmware": "4.6.415145",
    "MAC": "08:E9:F6:8F:33:A1",
    "plm_support": "0x40016"
}"#;

pub const PLAYER_STATUS: &str = r#"{
    "type": "0", "ch": "0", "mode": "31", "loop": "4", "eq": "0",
    "status": "play", "curpos": "48734", "offset_pts": "48734", "totlen": "215000",
    "Title": "536F2057686174", "Artist": "", "Album": "",
    "alarmflag": "0", "plicount": "0", "plicurr": "0",
    "vol": "30", "mute": "0"
}"#;

pub const META_INFO: &str = r#"{"metaData":{
    "album": "Kind of Blue",
    "title": "So What",
    "artist": "Miles Davis",
    "albumArtURI": "https://i.scdn.co/image/ab67616d0000b273",
    "sampleRate": "44100",
    "bitDepth": "16"
}}"#;

pub const PRESET_INFO: &str = r#"{"preset_num": 4, "preset_list": [
    {"number": 1, "name": "Discover Weekly", "url": "spotify:playlist:37i9dQZEVXcJ", "source": "Spotify", "picurl": ""},
    {"number": 2, "name": "Pandora Jazz", "url": "", "source": "Pandora", "picurl": ""},
    {"number": 3, "name": "Release Radar", "url": "spotify:playlist:37i9dQZEVXbn", "source": "Spotify", "picurl": ""},
    {"number": 4, "name": "KEXP", "url": "http://live-mp3-128.kexp.org/kexp128.mp3", "source": "URL", "picurl": ""}
]}"#;

pub const EQ_LIST: &str = r#"["Flat","Acoustic","Bass Booster","Rock"]"#;

pub const OUTPUT_MODE: &str = r#"{"hardware":"2","source":"0","audiocast":"0"}"#;

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Result<String, HttpError>>>,
    sticky: HashMap<String, Result<String, HttpError>>,
    calls: Vec<String>,
    offline: bool,
}

/// Transport answering from a script and recording every call
///
/// Lookup order: `offline`, one-shot queued responses, sticky responses,
/// then `OK` for writes and `unknown command` for unscripted reads.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A WiiM Pro with four presets, EQ and output switching
    pub fn wiim_pro() -> Arc<Self> {
        let transport = Self::new();
        transport.respond("getStatusEx", STATUS_EX);
        transport.respond("getPlayerStatus", PLAYER_STATUS);
        transport.respond("getMetaInfo", META_INFO);
        transport.respond("getPresetInfo", PRESET_INFO);
        transport.respond("EQGetList", EQ_LIST);
        transport.respond("getNewAudioOutputHardwareMode", OUTPUT_MODE);
        transport
    }

    /// The same device on firmware without output or EQ support
    pub fn without_outputs() -> Arc<Self> {
        let transport = Self::wiim_pro();
        transport.respond("getNewAudioOutputHardwareMode", "unknown command");
        transport.respond("EQGetList", "unknown command");
        transport
    }

    /// Answer `command` with `body` until changed
    pub fn respond(&self, command: &str, body: &str) {
        self.lock().sticky.insert(command.to_string(), Ok(body.to_string()));
    }

    /// Fail `command` with `error` until changed
    pub fn fail(&self, command: &str, error: HttpError) {
        self.lock().sticky.insert(command.to_string(), Err(error));
    }

    /// Answer the next call of `command` once, before any sticky response
    pub fn queue(&self, command: &str, response: Result<&str, HttpError>) {
        self.lock()
            .queued
            .entry(command.to_string())
            .or_default()
            .push_back(response.map(str::to_string));
    }

    /// Make every request fail as a network error
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Calls that are not reads
    pub fn writes(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| !is_read(c)).collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == command).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }
}

fn is_read(command: &str) -> bool {
    READS.contains(&command)
}

impl Transport for ScriptedTransport {
    fn request(&self, command: &str) -> Result<String, HttpError> {
        let mut script = self.lock();
        script.calls.push(command.to_string());

        if script.offline {
            return Err(HttpError::Network("connection refused".to_string()));
        }
        if let Some(response) = script.queued.get_mut(command).and_then(VecDeque::pop_front) {
            return response;
        }
        if let Some(response) = script.sticky.get(command) {
            return response.clone();
        }
        if is_read(command) {
            Ok("unknown command".to_string())
        } else {
            Ok("OK".to_string())
        }
    }
}

/// Engine configuration with timings short enough for tests
pub fn fast_config() -> EngineConfig {
    EngineConfig::new("10.0.0.40")
        .with_poll_interval(Duration::from_millis(40))
        .with_request_timeout(Duration::from_millis(200))
        .with_min_request_spacing(Duration::ZERO)
        .with_reconnect_backoff(Duration::from_millis(20), Duration::from_millis(80))
        .with_command_settle_delay(Duration::from_millis(10))
        .with_command_timeout(Duration::from_secs(2))
}

/// Poll `check` until it holds or `timeout` passes
pub fn eventually<F: FnMut() -> bool>(timeout: Duration, mut check: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    check()
}
