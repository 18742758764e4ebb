//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::config::{Config, WifiConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//!
//! // Or customize
//! let config = Config::default()
//!     .with_wifi(WifiConfig::station("HomeWifi", "secret"))
//!     .with_web(WebConfig::default().with_port(3000));
//! ```

use heapless::String as HString;

use crate::drive::{Duty, DEFAULT_DUTY};
use crate::interlock::VoltageCalibration;

/// Maximum length for short config strings (SSIDs, passwords)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Last char boundary that still fits the capacity; a multi-byte char
    // straddling the limit is dropped whole.
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= MAX_SHORT_STRING)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Drive pins, topology, and PWM settings
    pub drive: DriveConfig,
    /// Battery ADC calibration and cutoff
    pub battery: BatteryConfig,
    /// WiFi configuration (station or softAP)
    pub wifi: WifiConfig,
    /// Web server configuration
    pub web: WebConfig,
}

impl Config {
    /// Set drive configuration
    pub fn with_drive(mut self, drive: DriveConfig) -> Self {
        self.drive = drive;
        self
    }

    /// Set battery configuration
    pub fn with_battery(mut self, battery: BatteryConfig) -> Self {
        self.battery = battery;
        self
    }

    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }
}

// ============================================================================
// Drive Config
// ============================================================================

/// GPIO numbers for one wheel side.
///
/// `rear` carries the ganged rear pair in the four-wheel topology and is
/// `None` in the two-wheel topology.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SidePins {
    /// Forward direction line
    pub forward: u8,
    /// Backward direction line
    pub backward: u8,
    /// Rear (forward, backward) pair, four-wheel topology only
    pub rear: Option<(u8, u8)>,
}

impl SidePins {
    /// Two-wheel side: one forward and one backward line
    pub const fn new(forward: u8, backward: u8) -> Self {
        Self {
            forward,
            backward,
            rear: None,
        }
    }

    /// Add the ganged rear pair (four-wheel topology)
    pub const fn with_rear(mut self, forward: u8, backward: u8) -> Self {
        self.rear = Some((forward, backward));
        self
    }
}

/// Drive pin assignments, PWM settings, and default speed
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveConfig {
    /// Left side pins
    pub left: SidePins,
    /// Right side pins
    pub right: SidePins,
    /// Left side PWM (enable) pin
    pub left_pwm: u8,
    /// Right side PWM (enable) pin
    pub right_pwm: u8,
    /// PWM frequency in Hz
    pub pwm_freq_hz: u32,
    /// Duty applied when a command carries no explicit speed
    pub default_duty: Duty,
}

impl Default for DriveConfig {
    /// Two-wheel reference wiring: left 27/26, right 25/33, PWM 14/12, 1 kHz.
    fn default() -> Self {
        Self {
            left: SidePins::new(27, 26),
            right: SidePins::new(25, 33),
            left_pwm: 14,
            right_pwm: 12,
            pwm_freq_hz: 1000,
            default_duty: Duty::new(DEFAULT_DUTY),
        }
    }
}

impl DriveConfig {
    /// Set the left side pins
    pub fn with_left(mut self, left: SidePins) -> Self {
        self.left = left;
        self
    }

    /// Set the right side pins
    pub fn with_right(mut self, right: SidePins) -> Self {
        self.right = right;
        self
    }

    /// Set the PWM pins
    pub fn with_pwm_pins(mut self, left: u8, right: u8) -> Self {
        self.left_pwm = left;
        self.right_pwm = right;
        self
    }

    /// Set the PWM frequency
    pub fn with_pwm_freq_hz(mut self, hz: u32) -> Self {
        self.pwm_freq_hz = hz;
        self
    }

    /// Set the default duty
    pub fn with_default_duty(mut self, duty: Duty) -> Self {
        self.default_duty = duty;
        self
    }

    /// True when either side carries a rear pair
    pub fn is_four_wheel(&self) -> bool {
        self.left.rear.is_some() || self.right.rear.is_some()
    }
}

// ============================================================================
// Battery Config
// ============================================================================

/// Battery sensing configuration
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryConfig {
    /// ADC input pin sampling the divider
    pub adc_pin: u8,
    /// ADC-to-volts calibration and cutoff
    pub calibration: VoltageCalibration,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            adc_pin: 35,
            calibration: VoltageCalibration::default(),
        }
    }
}

impl BatteryConfig {
    /// Set the ADC pin
    pub fn with_adc_pin(mut self, pin: u8) -> Self {
        self.adc_pin = pin;
        self
    }

    /// Set the calibration
    pub fn with_calibration(mut self, calibration: VoltageCalibration) -> Self {
        self.calibration = calibration;
        self
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi operating mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WifiMode {
    /// Join an existing network
    #[default]
    Station,
    /// Broadcast our own network (vehicle is the access point)
    SoftAp,
}

/// WiFi configuration covering both station and softAP operation
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// Operating mode
    pub mode: WifiMode,
    /// Network SSID (the network to join, or the one to broadcast)
    pub ssid: ShortString,
    /// Network password
    pub password: ShortString,
    /// SoftAP channel (1-13)
    pub channel: u8,
}

impl Default for WifiConfig {
    /// Defaults to softAP with the reference vehicle's network settings.
    fn default() -> Self {
        Self {
            mode: WifiMode::SoftAp,
            ssid: short_string("4WheelVoiceCar"),
            password: short_string("voicecar123"),
            channel: 6,
        }
    }
}

impl WifiConfig {
    /// Station-mode config joining an existing network
    pub fn station(ssid: &str, password: &str) -> Self {
        Self {
            mode: WifiMode::Station,
            ssid: short_string(ssid),
            password: short_string(password),
            ..Self::default()
        }
    }

    /// SoftAP-mode config broadcasting the given network
    pub fn soft_ap(ssid: &str, password: &str) -> Self {
        Self {
            mode: WifiMode::SoftAp,
            ssid: short_string(ssid),
            password: short_string(password),
            ..Self::default()
        }
    }

    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the softAP channel
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 80,
            cors_permissive: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
