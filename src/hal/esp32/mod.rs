//! ESP32 hardware implementations.
//!
//! Requires the `esp32` feature and the ESP-IDF toolchain.
//!
//! - [`Esp32Pin`] / [`Esp32Pwm`] / [`Esp32Battery`]: GPIO, LEDC PWM, and
//!   oneshot ADC backing the hardware traits
//! - [`Esp32Wifi`]: station or softAP bring-up (feature `wifi`)
//! - [`Esp32HttpServer`]: esp-idf-svc HTTP server exposing the command
//!   routes (feature `esp32-http`)

pub mod pins;

#[cfg(feature = "wifi")]
pub mod wifi;

#[cfg(feature = "esp32-http")]
pub mod http;

pub use pins::*;

#[cfg(feature = "wifi")]
pub use wifi::*;

#[cfg(feature = "esp32-http")]
pub use http::*;
