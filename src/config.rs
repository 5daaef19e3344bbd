use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for a single TV
///
/// Deserializable so applications can keep it in their own config files.
///
/// ```
/// use braviarc::ClientConfig;
///
/// let config = ClientConfig::new("192.168.1.20")
///     .with_mac("AA:BB:CC:DD:EE:FF")
///     .with_psk("0000");
/// assert_eq!(config.base_url(), "http://192.168.1.20");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host name or IP address, optionally with a port (`192.168.1.20:8080`)
    pub host: String,

    /// Hardware address used for Wake-on-LAN
    #[serde(default)]
    pub mac: Option<String>,

    /// Pre-shared key sent as `X-Auth-PSK`
    #[serde(default)]
    pub psk: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log failed requests at `error` level (otherwise `debug`)
    #[serde(default = "default_log_errors")]
    pub log_errors: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_errors() -> bool {
    true
}

impl ClientConfig {
    /// Create a config for the given host with default settings
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            mac: None,
            psk: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_errors: true,
        }
    }

    /// Set the MAC address used for Wake-on-LAN
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Set the pre-shared key
    pub fn with_psk(mut self, psk: impl Into<String>) -> Self {
        self.psk = Some(psk.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Enable or disable error-level logging of failed requests
    pub fn with_log_errors(mut self, log_errors: bool) -> Self {
        self.log_errors = log_errors;
        self
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Root URL of the TV. A host that already carries a scheme is used as-is.
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        }
    }

    /// Pre-shared key, ignoring blank values
    pub(crate) fn psk(&self) -> Option<&str> {
        self.psk.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}
