//! Engine configuration
//!
//! [`EngineConfig`] is the static configuration object handed to the engine
//! at construction. [`StoredConfig`] is its persisted subset, a small JSON
//! file a host setup flow can write once and reload on every start.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wiim_api::{HttpConfig, Scheme};

use crate::error::{Result, SdkError};

/// Optional behaviors a host can switch off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    /// Read the active audio output on every tick when the device supports switching
    /// Default: true
    pub track_audio_output: bool,

    /// Report no metadata or progress while the device is stopped
    /// Default: true
    pub clear_metadata_on_stop: bool,

    /// Accept display on/off and reboot commands
    /// Default: true
    pub device_functions: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            track_audio_output: true,
            clear_metadata_on_stop: true,
            device_functions: true,
        }
    }
}

/// Configuration for one device binding
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Device address, `192.168.1.40` or `wiim-kitchen.local`
    pub host: String,

    /// Protocol for `httpapi.asp`
    /// Default: Https
    pub scheme: Scheme,

    /// Interval between state polls
    /// Default: 5 seconds
    pub poll_interval: Duration,

    /// Timeout for every device call
    /// Default: 5 seconds
    pub request_timeout: Duration,

    /// Minimum gap between consecutive device requests
    /// Default: 200 milliseconds
    pub min_request_spacing: Duration,

    /// Consecutive unreachable results before the connection is demoted
    /// Default: 3
    pub failure_threshold: u32,

    /// First reconnect delay; doubles per failed attempt
    /// Default: 1 second
    pub reconnect_initial_backoff: Duration,

    /// Upper bound for the reconnect delay
    /// Default: 60 seconds
    pub reconnect_max_backoff: Duration,

    /// Delay of the extra poll after a successful command
    /// Default: 1 second
    pub command_settle_delay: Duration,

    /// How long a queued command may wait before it expires
    /// Default: 10 seconds
    pub command_timeout: Duration,

    pub features: FeatureToggles,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            scheme: Scheme::Https,
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            min_request_spacing: Duration::from_millis(200),
            failure_threshold: 3,
            reconnect_initial_backoff: Duration::from_secs(1),
            reconnect_max_backoff: Duration::from_secs(60),
            command_settle_delay: Duration::from_secs(1),
            command_timeout: Duration::from_secs(10),
            features: FeatureToggles::default(),
        }
    }
}

/// Upper bound for every configured duration
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

impl EngineConfig {
    /// Default configuration for `host`
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(SdkError::InvalidHost("host must not be empty".to_string()));
        }
        if host.contains("://") || host.contains('/') || host.contains(char::is_whitespace) {
            return Err(SdkError::InvalidHost(format!(
                "expected a bare address without scheme or path, got {:?}",
                self.host
            )));
        }

        if self.poll_interval.is_zero() {
            return Err(SdkError::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(SdkError::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.failure_threshold == 0 {
            return Err(SdkError::Config(
                "Failure threshold must be at least 1".to_string(),
            ));
        }

        if self.reconnect_initial_backoff.is_zero() {
            return Err(SdkError::Config(
                "Initial reconnect backoff must be greater than 0".to_string(),
            ));
        }

        if self.reconnect_initial_backoff > self.reconnect_max_backoff {
            return Err(SdkError::Config(
                "Invalid reconnect backoff: initial must not exceed max".to_string(),
            ));
        }

        if self.command_timeout.is_zero() {
            return Err(SdkError::Config(
                "Command timeout must be greater than 0".to_string(),
            ));
        }

        let bounded = [
            ("Poll interval", self.poll_interval),
            ("Request timeout", self.request_timeout),
            ("Request spacing", self.min_request_spacing),
            ("Max reconnect backoff", self.reconnect_max_backoff),
            ("Command settle delay", self.command_settle_delay),
            ("Command timeout", self.command_timeout),
        ];
        if let Some((name, value)) = bounded.iter().find(|(_, value)| *value > MAX_DURATION) {
            return Err(SdkError::Config(format!(
                "{} of {:?} exceeds the {:?} limit",
                name, value, MAX_DURATION
            )));
        }

        Ok(())
    }

    /// Transport configuration derived from this engine configuration
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(self.scheme, self.host.trim())
            .with_request_timeout(self.request_timeout)
            .with_min_request_spacing(self.min_request_spacing)
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_min_request_spacing(mut self, spacing: Duration) -> Self {
        self.min_request_spacing = spacing;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_initial_backoff = initial;
        self.reconnect_max_backoff = max;
        self
    }

    pub fn with_command_settle_delay(mut self, delay: Duration) -> Self {
        self.command_settle_delay = delay;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_features(mut self, features: FeatureToggles) -> Self {
        self.features = features;
        self
    }
}

const CONFIG_FILE: &str = "config.json";

/// Directory holding `config.json`
///
/// `WIIM_CONFIG_HOME` when set, otherwise `wiim-sdk` under the platform
/// configuration directory.
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var_os("WIIM_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|dir| dir.join("wiim-sdk")),
    }
}

/// Persisted device binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// `http` or `https`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl StoredConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Load from the default location; `None` when nothing is configured yet
    pub fn load() -> Result<Option<Self>> {
        let dir = config_dir()
            .ok_or_else(|| SdkError::Config("no configuration directory available".to_string()))?;
        Self::load_from(&dir)
    }

    /// Load `config.json` from `dir`; `None` when the file does not exist
    pub fn load_from(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored configuration at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Save to the default location, returning the file path
    pub fn save(&self) -> Result<PathBuf> {
        let dir = config_dir()
            .ok_or_else(|| SdkError::Config("no configuration directory available".to_string()))?;
        self.save_to(&dir)
    }

    /// Write `config.json` into `dir`, creating the directory if needed
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Saved configuration for {} to {}", self.host, path.display());
        Ok(path)
    }

    /// Apply the stored values over the engine defaults
    pub fn into_engine_config(self) -> Result<EngineConfig> {
        let mut config = EngineConfig::new(self.host);

        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Some(scheme) = self.scheme.as_deref() {
            config.scheme = match scheme.trim().to_ascii_lowercase().as_str() {
                "http" => Scheme::Http,
                "https" => Scheme::Https,
                other => {
                    return Err(SdkError::Config(format!("unknown scheme {:?}", other)));
                }
            };
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wiim-sdk-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::new("192.168.1.40");
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.failure_threshold, 3);
        assert!(config.features.track_audio_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            EngineConfig::default().validate(),
            Err(SdkError::InvalidHost(_))
        ));
        assert!(matches!(
            EngineConfig::new("https://10.0.0.2").validate(),
            Err(SdkError::InvalidHost(_))
        ));

        let zero_poll = EngineConfig::new("10.0.0.2").with_poll_interval(Duration::ZERO);
        assert!(matches!(zero_poll.validate(), Err(SdkError::Config(_))));

        let inverted = EngineConfig::new("10.0.0.2")
            .with_reconnect_backoff(Duration::from_secs(90), Duration::from_secs(60));
        assert!(inverted.validate().is_err());

        let no_threshold = EngineConfig::new("10.0.0.2").with_failure_threshold(0);
        assert!(no_threshold.validate().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new("10.0.0.2")
            .with_scheme(Scheme::Http)
            .with_poll_interval(Duration::from_secs(2))
            .with_failure_threshold(5)
            .with_command_settle_delay(Duration::from_millis(500))
            .with_features(FeatureToggles {
                device_functions: false,
                ..Default::default()
            });

        assert_eq!(config.scheme, Scheme::Http);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.failure_threshold, 5);
        assert!(!config.features.device_functions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_config() {
        let http = EngineConfig::new("10.0.0.2").with_scheme(Scheme::Http).http_config();
        assert_eq!(http.base_url, "http://10.0.0.2");
    }

    #[test]
    fn test_stored_config_roundtrip_on_disk() {
        let dir = scratch_dir("roundtrip");
        assert_eq!(StoredConfig::load_from(&dir).unwrap(), None);

        let stored = StoredConfig {
            host: "10.0.0.7".to_string(),
            poll_interval_secs: Some(3),
            scheme: Some("http".to_string()),
        };
        let path = stored.save_to(&dir).unwrap();
        assert!(path.ends_with("config.json"));

        let loaded = StoredConfig::load_from(&dir).unwrap().unwrap();
        assert_eq!(loaded, stored);

        let config = loaded.into_engine_config().unwrap();
        assert_eq!(config.host, "10.0.0.7");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.scheme, Scheme::Http);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let stored: StoredConfig =
            serde_json::from_str(r#"{"host":"10.0.0.40","poll_interval_secs":18446744073709551615}"#)
                .unwrap();
        assert!(matches!(stored.into_engine_config(), Err(SdkError::Config(_))));

        let config = EngineConfig::new("10.0.0.40").with_command_timeout(Duration::MAX);
        assert!(config.validate().is_err());

        let config = EngineConfig::new("10.0.0.40")
            .with_reconnect_backoff(Duration::from_secs(1), MAX_DURATION * 2);
        assert!(config.validate().is_err());

        let config = EngineConfig::new("10.0.0.40").with_poll_interval(MAX_DURATION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stored_config_minimal_file() {
        let stored: StoredConfig = serde_json::from_str(r#"{"host":"wiim.local"}"#).unwrap();
        let config = stored.into_engine_config().unwrap();
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_stored_config_rejects_unknown_scheme() {
        let stored = StoredConfig {
            scheme: Some("ftp".to_string()),
            ..StoredConfig::new("10.0.0.7")
        };
        assert!(matches!(stored.into_engine_config(), Err(SdkError::Config(_))));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.json"), "{ not json").unwrap();
        assert!(matches!(StoredConfig::load_from(&dir), Err(SdkError::Json(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
