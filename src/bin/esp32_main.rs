//! ESP32 rover firmware entry point.
//!
//! Brings up the drive outputs, the battery ADC, WiFi (station or softAP
//! per config), and the HTTP server, then parks: all commands arrive
//! through the HTTP callbacks and serialize through the shared dispatcher.
//!
//! # Hardware Setup
//!
//! Two-wheel reference wiring (L298N dual H-bridge):
//! - GPIO27/26 → left forward/backward, GPIO14 → left enable (PWM)
//! - GPIO25/33 → right forward/backward, GPIO12 → right enable (PWM)
//! - GPIO35 → battery divider tap (2:1 into ADC1)
//!
//! # Build
//!
//! ```bash
//! cargo build --bin esp32_main --features esp32-http --target xtensa-esp32-espidf
//! ```

use esp_idf_hal::adc::oneshot::AdcDriver;
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripherals::Peripherals;
use rs_rover::hal::esp32::{Esp32Battery, Esp32Pin, Esp32Pwm};
use rs_rover::{
    BatteryMonitor, CommandDispatcher, Config, DriveController, MotorGroup, WifiConfig,
};
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();

    println!();
    println!("==========================");
    println!("  rs-rover");
    println!("==========================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    // Station credentials via env vars at build time; softAP defaults
    // otherwise (vehicle broadcasts its own network at 192.168.4.1).
    let wifi_config = match option_env!("WIFI_SSID") {
        Some(ssid) => WifiConfig::station(ssid, option_env!("WIFI_PASSWORD").unwrap_or("")),
        None => WifiConfig::default(),
    };
    let config = Config::default().with_wifi(wifi_config);

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Drive outputs (two-wheel reference wiring)
    // =========================================================================
    let left = MotorGroup::new(
        Esp32Pin::new(peripherals.pins.gpio27.downgrade_output())?,
        Esp32Pin::new(peripherals.pins.gpio26.downgrade_output())?,
        Esp32Pwm::new(
            peripherals.ledc.timer0,
            peripherals.ledc.channel0,
            peripherals.pins.gpio14,
            config.drive.pwm_freq_hz,
        )?,
    );
    let right = MotorGroup::new(
        Esp32Pin::new(peripherals.pins.gpio25.downgrade_output())?,
        Esp32Pin::new(peripherals.pins.gpio33.downgrade_output())?,
        Esp32Pwm::new(
            peripherals.ledc.timer1,
            peripherals.ledc.channel1,
            peripherals.pins.gpio12,
            config.drive.pwm_freq_hz,
        )?,
    );

    let mut drive = DriveController::new(left, right);
    drive.stop()?;
    println!("[OK] Drive initialized (GPIO27/26 + GPIO25/33, PWM 14/12)");

    // =========================================================================
    // Battery sensing (ADC1 on GPIO35)
    // =========================================================================
    // The ADC driver must outlive the HTTP handlers, so give it 'static.
    let adc: &'static AdcDriver<'static, _> = Box::leak(Box::new(AdcDriver::new(peripherals.adc1)?));
    let battery = Esp32Battery::new(adc, peripherals.pins.gpio35)?;
    let monitor = BatteryMonitor::new(battery, config.battery.calibration);
    println!(
        "[OK] Battery monitor initialized (GPIO35, cutoff {:.1} V)",
        config.battery.calibration.cutoff_volts
    );

    let dispatcher =
        CommandDispatcher::new(drive, monitor).with_default_duty(config.drive.default_duty);

    // =========================================================================
    // WiFi
    // =========================================================================
    #[cfg(feature = "wifi")]
    let _wifi = {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;
        use rs_rover::hal::esp32::Esp32Wifi;

        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let wifi = Esp32Wifi::new(peripherals.modem, sysloop, Some(nvs), &config.wifi)?;
        println!("[OK] WiFi up: {:?}", wifi.ip_addr());
        wifi
    };

    // =========================================================================
    // HTTP server
    // =========================================================================
    #[cfg(feature = "esp32-http")]
    let _server = {
        use rs_rover::hal::esp32::Esp32HttpServer;
        use rs_rover::services::SharedDispatcher;
        use std::sync::Arc;

        let shared = Arc::new(SharedDispatcher::new(dispatcher));
        let server = Esp32HttpServer::new(&config.web, shared)?;
        println!("[OK] HTTP server started on port {}", config.web.port);
        server
    };

    #[cfg(not(feature = "esp32-http"))]
    let _dispatcher = dispatcher;

    println!();
    println!("Routes:");
    println!("  GET /forward|/backward|/left|/right|/stop (?duty=N)");
    println!("  GET /api/state");
    println!("  GET /");
    println!();

    // Everything is callback-driven from here
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
