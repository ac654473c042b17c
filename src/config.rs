//! Compile-time configuration.
//!
//! All configuration is fixed at build time: Wi-Fi credentials, the ingest
//! endpoint, and the device name come from environment variables read via
//! `option_env!`, everything else is a named constant. There is no runtime
//! provisioning and no persisted configuration.
//!
//! Build with e.g.:
//!
//! ```sh
//! ENVSENSE_WIFI_SSID=MyNetwork \
//! ENVSENSE_WIFI_PSK=MyPassword \
//! ENVSENSE_ENDPOINT=https://ingest.example.com/readings \
//! cargo build --features esp32 --target xtensa-esp32-espidf
//! ```

use std::fmt;
use std::time::Duration;

/// Maximum SSID length per IEEE 802.11 standard.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum password length for WPA2.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Minimum password length for WPA2.
pub const MIN_PASSWORD_LEN: usize = 8;

/// How long to keep polling the I2C bus for the sensor before giving up.
pub const SENSOR_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between sensor detection attempts.
pub const SENSOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Settle time between configuring the sensor and reading it.
pub const SENSOR_SETTLE: Duration = Duration::from_millis(500);

/// Target wake-to-wake interval. The deep sleep duration is this minus the
/// time spent awake in the current cycle.
pub const RUNTIME_INTERVAL: Duration = Duration::from_secs(600);

/// Floor for the deep sleep duration, applied when a cycle overruns
/// [`RUNTIME_INTERVAL`].
pub const MIN_SLEEP: Duration = Duration::from_secs(10);

/// Timeout for the HTTP POST (connect + request + response).
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// I2C bus frequency in Hz.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

/// Device name used when `ENVSENSE_DEVICE_NAME` is not set at build time.
pub const DEFAULT_DEVICE_NAME: &str = "envsense";

/// Wi-Fi credentials for connecting to an access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiConfig {
    /// Network SSID (1-32 bytes).
    pub ssid: String,
    /// Network password (8-64 bytes for WPA2, empty for open networks).
    pub password: String,
}

impl WifiConfig {
    /// Create a new Wi-Fi configuration.
    ///
    /// Returns an error if SSID or password are invalid.
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            ssid: ssid.into(),
            password: password.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration for an open network (no password).
    pub fn open(ssid: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            ssid: ssid.into(),
            password: String::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::SsidEmpty);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong {
                len: self.ssid.len(),
                max: MAX_SSID_LEN,
            });
        }

        // Empty password is OK for open networks
        if !self.password.is_empty() && self.password.len() < MIN_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooShort {
                len: self.password.len(),
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooLong {
                len: self.password.len(),
                max: MAX_PASSWORD_LEN,
            });
        }

        Ok(())
    }

    /// Check if this is an open network (no password).
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

/// Full firmware configuration for one wake cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Wi-Fi credentials.
    pub wifi: WifiConfig,
    /// Ingest endpoint the reading is POSTed to.
    pub endpoint: String,
    /// Device name included in every payload.
    pub device_name: String,
}

impl Config {
    /// Create a new configuration.
    pub fn new(
        wifi: WifiConfig,
        endpoint: impl Into<String>,
        device_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            wifi,
            endpoint: endpoint.into(),
            device_name: device_name.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration from compile-time environment variables.
    ///
    /// Reads `ENVSENSE_WIFI_SSID`, `ENVSENSE_WIFI_PSK`, `ENVSENSE_ENDPOINT`
    /// and `ENVSENSE_DEVICE_NAME`. The first three are required; the device
    /// name falls back to [`DEFAULT_DEVICE_NAME`].
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let ssid = option_env!("ENVSENSE_WIFI_SSID").unwrap_or_default();
        let psk = option_env!("ENVSENSE_WIFI_PSK").unwrap_or_default();
        let endpoint = option_env!("ENVSENSE_ENDPOINT").unwrap_or_default();
        let device_name = option_env!("ENVSENSE_DEVICE_NAME").unwrap_or(DEFAULT_DEVICE_NAME);

        let wifi = WifiConfig::new(ssid, psk)?;
        Self::new(wifi, endpoint, device_name)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wifi.validate()?;
        validate_endpoint(&self.endpoint)?;
        if self.device_name.is_empty() {
            return Err(ConfigError::DeviceNameEmpty);
        }
        Ok(())
    }
}

/// Check that the endpoint is an HTTP(S) URL with a non-empty host.
fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.is_empty() {
        return Err(ConfigError::EndpointEmpty);
    }

    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| ConfigError::EndpointInvalid(endpoint.to_string()))?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(ConfigError::EndpointInvalid(endpoint.to_string()));
    }

    Ok(())
}

/// Errors that can occur during configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Password is too short for WPA2.
    PasswordTooShort { len: usize, min: usize },
    /// Password exceeds maximum length.
    PasswordTooLong { len: usize, max: usize },
    /// Ingest endpoint is not set.
    EndpointEmpty,
    /// Ingest endpoint is not a usable HTTP(S) URL.
    EndpointInvalid(String),
    /// Device name is empty.
    DeviceNameEmpty,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PasswordTooShort { len, min } => {
                write!(f, "password too short: {} bytes (min {})", len, min)
            }
            Self::PasswordTooLong { len, max } => {
                write!(f, "password too long: {} bytes (max {})", len, max)
            }
            Self::EndpointEmpty => write!(f, "ingest endpoint is not set"),
            Self::EndpointInvalid(url) => write!(f, "invalid ingest endpoint: {}", url),
            Self::DeviceNameEmpty => write!(f, "device name cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn wifi() -> WifiConfig {
        WifiConfig::new("TestNetwork", "password123").unwrap()
    }

    // ==================== WifiConfig Tests ====================

    #[test]
    fn test_valid_wifi_config() {
        let config = wifi();
        assert_eq!(config.ssid, "TestNetwork");
        assert_eq!(config.password, "password123");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_network() {
        let config = WifiConfig::open("OpenNetwork").unwrap();
        assert!(config.is_open());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_ssid() {
        let result = WifiConfig::new("", "password123");
        assert_eq!(result, Err(ConfigError::SsidEmpty));
    }

    #[test]
    fn test_ssid_too_long() {
        let long_ssid = "a".repeat(33);
        let result = WifiConfig::new(long_ssid, "password123");
        assert!(matches!(result, Err(ConfigError::SsidTooLong { .. })));
    }

    #[test]
    fn test_ssid_max_length() {
        let max_ssid = "a".repeat(32);
        let config = WifiConfig::new(max_ssid, "password123").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_too_short() {
        let result = WifiConfig::new("TestNetwork", "short");
        assert!(matches!(result, Err(ConfigError::PasswordTooShort { .. })));
    }

    #[test]
    fn test_password_min_length() {
        let config = WifiConfig::new("TestNetwork", "12345678").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(65);
        let result = WifiConfig::new("TestNetwork", long_password);
        assert!(matches!(result, Err(ConfigError::PasswordTooLong { .. })));
    }

    // ==================== Endpoint Tests ====================

    #[test]
    fn test_valid_https_endpoint() {
        let config = Config::new(wifi(), "https://ingest.example.com/readings", "probe-1");
        assert!(config.is_ok());
    }

    #[test]
    fn test_valid_http_endpoint_without_path() {
        let config = Config::new(wifi(), "http://192.168.1.10:8080", "probe-1");
        assert!(config.is_ok());
    }

    #[test]
    fn test_empty_endpoint() {
        let result = Config::new(wifi(), "", "probe-1");
        assert_eq!(result, Err(ConfigError::EndpointEmpty));
    }

    #[test]
    fn test_endpoint_without_scheme() {
        let result = Config::new(wifi(), "ingest.example.com/readings", "probe-1");
        assert!(matches!(result, Err(ConfigError::EndpointInvalid(_))));
    }

    #[test]
    fn test_endpoint_without_host() {
        let result = Config::new(wifi(), "https:///readings", "probe-1");
        assert!(matches!(result, Err(ConfigError::EndpointInvalid(_))));
    }

    // ==================== Device Name Tests ====================

    #[test]
    fn test_empty_device_name() {
        let result = Config::new(wifi(), "https://ingest.example.com", "");
        assert_eq!(result, Err(ConfigError::DeviceNameEmpty));
    }

    #[test]
    fn test_default_device_name_is_valid() {
        let config = Config::new(
            wifi(),
            "https://ingest.example.com",
            DEFAULT_DEVICE_NAME,
        )
        .unwrap();
        assert_eq!(config.device_name, "envsense");
    }
}
