//! Private HTTP client for WiiM device communication
//!
//! This crate provides a minimal blocking client for the LinkPlay
//! `httpapi.asp` command endpoint used by WiiM streamers. Every call is a
//! single GET with bounded connect and request timeouts. Nothing is retried
//! here; retry policy belongs to the callers that know the intent.

mod error;

pub use error::HttpError;

use parking_lot::Mutex;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// URL scheme used to reach the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP on port 80 (older LinkPlay firmware)
    Http,
    /// HTTPS on port 443 with the device's self-signed certificate
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Something that can deliver one raw device command and return its body
///
/// [`HttpClient`] is the production implementation. Tests drive the upper
/// layers with scripted transports instead.
pub trait Transport: Send + Sync {
    /// Send `command` (unencoded, e.g. `setPlayerCmd:vol:30`) and return the body
    fn request(&self, command: &str) -> Result<String, HttpError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn request(&self, command: &str) -> Result<String, HttpError> {
        (**self).request(command)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn request(&self, command: &str) -> Result<String, HttpError> {
        (**self).request(command)
    }
}

/// Configuration for [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the device, e.g. `https://192.168.1.40`
    pub base_url: String,

    /// Timeout for establishing the connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Timeout for the whole request including the body
    /// Default: 5 seconds
    pub request_timeout: Duration,

    /// Minimum gap between two consecutive requests
    /// Default: 200 milliseconds
    pub min_request_spacing: Duration,
}

impl HttpConfig {
    /// Configuration for a device reachable at `host` over `scheme`
    pub fn new(scheme: Scheme, host: &str) -> Self {
        Self::from_base_url(format!("{}://{}", scheme.as_str(), host))
    }

    /// Configuration for an explicit base URL (used against mock servers)
    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            min_request_spacing: Duration::from_millis(200),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = self.connect_timeout.min(timeout);
        self.request_timeout = timeout;
        self
    }

    pub fn with_min_request_spacing(mut self, spacing: Duration) -> Self {
        self.min_request_spacing = spacing;
        self
    }
}

/// A minimal client for the device's command endpoint
pub struct HttpClient {
    agent: ureq::Agent,
    config: HttpConfig,
    last_request: Mutex<Option<Instant>>,
}

impl HttpClient {
    /// Create a client for the given configuration
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let builder = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout(config.request_timeout);

        Ok(Self {
            agent: with_tls(builder)?.build(),
            config,
            last_request: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Full request URL for a raw command
    pub fn command_url(&self, command: &str) -> String {
        format!(
            "{}/httpapi.asp?command={}",
            self.config.base_url,
            encode_command(command)
        )
    }

    /// Hold the caller until the minimum request spacing has passed
    fn pace(&self) {
        let mut last = self.last_request.lock();
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.min_request_spacing {
                std::thread::sleep(self.config.min_request_spacing - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

impl Transport for HttpClient {
    fn request(&self, command: &str) -> Result<String, HttpError> {
        self.pace();

        let url = self.command_url(command);
        tracing::debug!("GET {}", url);

        match self.agent.get(&url).call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| HttpError::Body(e.to_string())),
            Err(ureq::Error::Status(code, _)) => Err(HttpError::Status(code)),
            Err(e) => Err(HttpError::Network(e.to_string())),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(feature = "native-tls")]
fn with_tls(builder: ureq::AgentBuilder) -> Result<ureq::AgentBuilder, HttpError> {
    let connector = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| HttpError::Tls(e.to_string()))?;
    Ok(builder.tls_connector(Arc::new(connector)))
}

#[cfg(not(feature = "native-tls"))]
fn with_tls(builder: ureq::AgentBuilder) -> Result<ureq::AgentBuilder, HttpError> {
    Ok(builder)
}

/// Characters left as-is in the `command=` query parameter
const COMMAND: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':');

/// Percent-encode a raw command for the `command=` query parameter
///
/// Unreserved characters and `:` pass through untouched because the device
/// firmware splits commands on the colon.
pub fn encode_command(command: &str) -> String {
    utf8_percent_encode(command, COMMAND).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain_command() {
        assert_eq!(encode_command("getPlayerStatus"), "getPlayerStatus");
        assert_eq!(encode_command("setPlayerCmd:vol:30"), "setPlayerCmd:vol:30");
    }

    #[test]
    fn test_encode_spaces_and_json() {
        assert_eq!(encode_command("EQLoad:Bass Booster"), "EQLoad:Bass%20Booster");
        assert_eq!(
            encode_command(r#"setLightOperationBrightConfig:{"disable":1}"#),
            "setLightOperationBrightConfig:%7B%22disable%22:1%7D"
        );
    }

    #[test]
    fn test_encode_utf8() {
        assert_eq!(encode_command("EQLoad:Café"), "EQLoad:Caf%C3%A9");
    }

    #[test]
    fn test_encode_keeps_unreserved_and_colon() {
        assert_eq!(encode_command("a-b_c.d~e:f"), "a-b_c.d~e:f");
        assert_eq!(encode_command("x&y=z?#"), "x%26y%3Dz%3F%23");
    }

    #[test]
    fn test_config_defaults() {
        let config = HttpConfig::new(Scheme::Https, "192.168.1.40");
        assert_eq!(config.base_url, "https://192.168.1.40");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.min_request_spacing, Duration::from_millis(200));
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = HttpConfig::from_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_shorter_request_timeout_caps_connect_timeout() {
        let config = HttpConfig::new(Scheme::Http, "10.0.0.2")
            .with_request_timeout(Duration::from_secs(2));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_command_url() {
        let client = HttpClient::new(HttpConfig::new(Scheme::Http, "10.0.0.2")).unwrap();
        assert_eq!(
            client.command_url("MCUKeyShortClick:3"),
            "http://10.0.0.2/httpapi.asp?command=MCUKeyShortClick:3"
        );
    }

    #[test]
    fn test_scheme_default_is_https() {
        assert_eq!(Scheme::default(), Scheme::Https);
        assert_eq!(Scheme::Http.as_str(), "http");
    }
}
