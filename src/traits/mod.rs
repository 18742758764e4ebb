//! Trait definitions for hardware abstraction.
//!
//! This module defines the abstractions that allow rs-rover to run on
//! different hardware (ESP32, desktop mock):
//!
//! - [`DigitalOutput`]: one H-bridge direction line
//! - [`PwmOutput`]: one PWM duty channel per wheel side
//! - [`VoltageSensor`]: battery voltage sampling via ADC
//!
//! The [`Direction`] enum lives here too since it is part of the hardware
//! vocabulary shared by every layer.

pub mod hardware;

pub use hardware::*;
