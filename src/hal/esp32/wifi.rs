//! WiFi bring-up for the ESP32 vehicle.
//!
//! Supports both operating modes from [`WifiMode`]:
//!
//! - **Station**: join an existing router; the vehicle gets an address via
//!   DHCP and is driven from elsewhere on the LAN.
//! - **SoftAP**: the vehicle broadcasts its own network (default SSID
//!   `4WheelVoiceCar` on channel 6) and serves at `192.168.4.1`; no
//!   infrastructure needed in the field.
//!
//! # Example
//!
//! ```ignore
//! use rs_rover::hal::esp32::Esp32Wifi;
//! use rs_rover::config::WifiConfig;
//!
//! let config = WifiConfig::station("MyNetwork", "secret123");
//! let wifi = Esp32Wifi::new(modem, sysloop, nvs, &config)?;
//! println!("IP: {:?}", wifi.ip_addr());
//! ```

use crate::config::{WifiConfig, WifiMode};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};
use std::net::Ipv4Addr;

/// WiFi manager for the vehicle.
///
/// The link is established during construction and held for the lifetime of
/// this struct.
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
    mode: WifiMode,
}

impl<'a> Esp32Wifi<'a> {
    /// Bring up WiFi in the configured mode.
    ///
    /// Station mode connects to the configured network and waits for DHCP.
    /// SoftAP mode starts broadcasting and waits for the network interface
    /// to come up (the default softAP address is 192.168.4.1).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - WiFi initialization fails
    /// - Station mode cannot connect to the access point
    /// - DHCP or netif bring-up times out
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &WifiConfig,
    ) -> anyhow::Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        // esp-idf wants its own fixed-capacity strings
        let mut ssid_buf: heapless::String<32> = heapless::String::new();
        let _ = ssid_buf.push_str(config.ssid.as_str());

        let mut pass_buf: heapless::String<64> = heapless::String::new();
        let _ = pass_buf.push_str(config.password.as_str());

        match config.mode {
            WifiMode::Station => {
                wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                    ssid: ssid_buf,
                    password: pass_buf,
                    ..Default::default()
                }))?;

                println!("[WiFi] Starting...");
                wifi.start()?;

                println!("[WiFi] Connecting to '{}'...", config.ssid.as_str());
                wifi.connect()?;

                println!("[WiFi] Waiting for DHCP...");
                wifi.wait_netif_up()?;

                if let Ok(ip_info) = wifi.wifi().sta_netif().get_ip_info() {
                    println!("[WiFi] Connected! IP: {}", ip_info.ip);
                }
            }
            WifiMode::SoftAp => {
                wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
                    ssid: ssid_buf,
                    password: pass_buf,
                    channel: config.channel,
                    auth_method: AuthMethod::WPA2Personal,
                    ..Default::default()
                }))?;

                println!("[WiFi] Starting access point...");
                wifi.start()?;
                wifi.wait_netif_up()?;

                if let Ok(ip_info) = wifi.wifi().ap_netif().get_ip_info() {
                    println!(
                        "[WiFi] Broadcasting '{}' on channel {}, IP: {}",
                        config.ssid.as_str(),
                        config.channel,
                        ip_info.ip
                    );
                }
            }
        }

        Ok(Self {
            wifi,
            mode: config.mode,
        })
    }

    /// The vehicle's IP address, if the link is up.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        let netif = match self.mode {
            WifiMode::Station => self.wifi.wifi().sta_netif(),
            WifiMode::SoftAp => self.wifi.wifi().ap_netif(),
        };
        netif.get_ip_info().ok().map(|info| info.ip)
    }

    /// Check if the link is up (station: associated; softAP: broadcasting).
    pub fn is_up(&self) -> bool {
        match self.mode {
            WifiMode::Station => self.wifi.is_connected().unwrap_or(false),
            WifiMode::SoftAp => self.wifi.is_started().unwrap_or(false),
        }
    }

    /// The active operating mode.
    pub fn mode(&self) -> WifiMode {
        self.mode
    }

    /// Get the underlying WiFi driver for advanced operations.
    pub fn driver(&self) -> &EspWifi<'a> {
        self.wifi.wifi()
    }
}
