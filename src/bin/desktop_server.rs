//! Desktop server for developing against the web UI without hardware.
//!
//! Runs the axum server over a full mock vehicle:
//! - Control page at http://localhost:8080
//! - All command routes (`/forward?duty=700`, `/stop`, ...)
//! - State endpoint at `/api/state`
//!
//! The mock battery reads a healthy pack through a 3:1 divider, so movement
//! commands execute. Drop `BATTERY_RAW` below the cutoff to exercise the
//! interlock from the browser.
//!
//! # Usage
//!
//! ```sh
//! cargo run --bin desktop_server --features web
//! ```

use std::sync::Arc;

use rs_rover::hal::{MockBattery, MockPin, MockPwm};
use rs_rover::services::web::{run_server, WebServerConfig};
use rs_rover::services::SharedDispatcher;
use rs_rover::{
    BatteryMonitor, CommandDispatcher, Config, DriveController, MotorGroup, VoltageCalibration,
};

/// Raw ADC count the mock battery reports (~9.7 V through a 3:1 divider).
const BATTERY_RAW: u16 = 4000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("==========================");
    println!("  rs-rover Desktop Server");
    println!("==========================");
    println!();

    let config = Config::default();
    // Example of customization:
    // let config = Config::default()
    //     .with_web(rs_rover::WebConfig::default().with_port(3000))
    //     .with_battery(rs_rover::BatteryConfig::default()
    //         .with_calibration(VoltageCalibration::default().with_cutoff_volts(6.4)));

    let drive = DriveController::new(
        MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
        MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
    );
    let monitor = BatteryMonitor::new(
        MockBattery::new(BATTERY_RAW),
        VoltageCalibration::default().with_divider_ratio(3.0),
    );
    let dispatcher =
        CommandDispatcher::new(drive, monitor).with_default_duty(config.drive.default_duty);

    // The vehicle config defaults to port 80; bind the development default
    // instead so the server runs unprivileged.
    let web_config = WebServerConfig::default();

    println!("  Control page: http://{}", web_config.addr);
    println!("  State:        http://{}/api/state", web_config.addr);
    println!();
    println!("Press Ctrl+C to stop.");
    println!();

    let shared = Arc::new(SharedDispatcher::new(dispatcher));
    run_server(shared, web_config).await?;
    Ok(())
}
