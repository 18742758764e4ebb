//! # rs-rover
//!
//! Control core of a battery-powered, WiFi-driven wheeled robot: discrete
//! motion commands become differential actuation of two or four motor
//! channels, guarded by a battery voltage interlock.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for direction lines, PWM duty, and
//!   battery sensing, with mock implementations for desktop development
//! - **Differential drive**: Exact per-side output patterns for forward,
//!   backward, pivot left, pivot right, and stop, with no transient state
//!   where a side's forward and backward lines are both asserted
//! - **Voltage interlock**: Movement commands are discarded (and the vehicle
//!   stopped) when the pack reads below the cutoff; `stop` always works
//! - **One dispatcher, many transports**: axum on desktop and esp-idf-svc
//!   on the vehicle drive the same mutex-guarded dispatcher
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions and the `Direction` vocabulary
//! - `drive` - Duty clamping, motor groups, and the drive controller
//! - `interlock` - Battery calibration, sampling, and enforcement
//! - `dispatch` - Token-to-motion dispatch with the voltage gate
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//! - `services` - Shared state, API types, and the web servers
//!
//! ## Example
//!
//! ```rust
//! use rs_rover::{
//!     BatteryMonitor, CommandDispatcher, DispatchOutcome, Direction,
//!     DriveController, Duty, MotorGroup, VoltageCalibration,
//!     hal::{MockBattery, MockPin, MockPwm},
//! };
//!
//! // Build a two-wheel vehicle on mock hardware
//! let drive = DriveController::new(
//!     MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
//!     MotorGroup::new(MockPin::new(), MockPin::new(), MockPwm::new()),
//! );
//! let monitor = BatteryMonitor::new(
//!     MockBattery::new(4000),
//!     VoltageCalibration::default().with_divider_ratio(3.0),
//! );
//! let mut dispatcher = CommandDispatcher::new(drive, monitor);
//!
//! // Dispatch command tokens
//! assert_eq!(
//!     dispatcher.dispatch("forward").unwrap(),
//!     DispatchOutcome::Executed(Direction::Forward),
//! );
//! dispatcher.dispatch_with_duty("left", Some(Duty::new(800))).unwrap();
//! dispatcher.dispatch("stop").unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Token-to-motion dispatch with the battery voltage gate.
pub mod dispatch;
/// Differential drive controller, motor groups, and duty clamping.
pub mod drive;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Battery voltage sampling, calibration, and enforcement.
pub mod interlock;
/// Core traits for hardware abstraction plus the `Direction` enum.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

/// Transport services: shared dispatcher state, API types, web servers.
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use dispatch::{CommandDispatcher, DispatchOutcome};
pub use drive::{DriveController, DriveState, Duty, MotorGroup, DEFAULT_DUTY, MAX_DUTY};
pub use interlock::{BatteryMonitor, VoltageCalibration};
pub use traits::{DigitalOutput, Direction, PwmOutput, VoltageSensor};

// Config re-exports
pub use config::{
    BatteryConfig, Config, DriveConfig, SidePins, WebConfig, WifiConfig, WifiMode,
};
