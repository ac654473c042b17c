//! ESP-IDF Wi-Fi driver wrapper.

use std::net::Ipv4Addr;

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::EspError;
use log::info;

use crate::config::WifiConfig;

/// Wi-Fi connection manager for one wake cycle.
pub struct WifiManager<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> WifiManager<'a> {
    /// Create a new Wi-Fi manager.
    pub fn new(modem: Modem, sysloop: EspSystemEventLoop) -> Result<Self, EspError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        Ok(Self { wifi })
    }

    /// Connect to the configured access point.
    ///
    /// Returns the IPv4 address acquired via DHCP. Association and DHCP
    /// rely on ESP-IDF's internal timeouts.
    pub fn connect(&mut self, config: &WifiConfig) -> Result<Ipv4Addr, WifiError> {
        info!("Connecting to Wi-Fi: {}", config.ssid);

        let auth_method = if config.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let wifi_config = Configuration::Client(ClientConfiguration {
            ssid: config
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| WifiError::InvalidSsid)?,
            password: config
                .password
                .as_str()
                .try_into()
                .map_err(|_| WifiError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&wifi_config)?;
        self.wifi.start()?;
        self.wifi.connect().map_err(WifiError::ConnectionFailed)?;
        self.wifi.wait_netif_up().map_err(WifiError::DhcpFailed)?;

        let ip = self.wifi.wifi().sta_netif().get_ip_info()?.ip;
        info!("Connected to Wi-Fi, IP: {}", ip);
        Ok(ip)
    }

    /// Disconnect and stop the driver before deep sleep.
    pub fn disconnect(&mut self) -> Result<(), EspError> {
        info!("Disconnecting from Wi-Fi");
        self.wifi.disconnect()?;
        self.wifi.stop()?;
        Ok(())
    }
}

/// Errors that can occur during Wi-Fi operations.
#[derive(Debug)]
pub enum WifiError {
    /// SSID does not fit the driver's fixed-size buffer.
    InvalidSsid,
    /// Password does not fit the driver's fixed-size buffer.
    InvalidPassword,
    /// Failed to associate with the access point.
    ConnectionFailed(EspError),
    /// Failed to obtain an IP address via DHCP.
    DhcpFailed(EspError),
    /// ESP-IDF error.
    EspError(EspError),
}

impl From<EspError> for WifiError {
    fn from(e: EspError) -> Self {
        Self::EspError(e)
    }
}

impl std::fmt::Display for WifiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "invalid SSID"),
            Self::InvalidPassword => write!(f, "invalid password"),
            Self::ConnectionFailed(e) => write!(f, "connection failed: {:?}", e),
            Self::DhcpFailed(e) => write!(f, "DHCP failed: {:?}", e),
            Self::EspError(e) => write!(f, "ESP error: {:?}", e),
        }
    }
}

impl std::error::Error for WifiError {}
