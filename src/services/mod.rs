//! Transport-facing services: shared state, API types, and the web server.
//!
//! The core dispatcher is single-threaded; everything in this module exists
//! to let concurrent transports (axum's multi-threaded runtime, esp-idf's
//! callback HTTP server) drive it safely through one mutex.

pub mod shared;

#[cfg(feature = "serde")]
pub mod api;

#[cfg(feature = "serde")]
pub mod handler;

#[cfg(feature = "web")]
pub mod web;

pub use shared::{RoverSnapshot, SharedDispatcher};

#[cfg(feature = "serde")]
pub use api::{ApiResponse, CommandResponse, StateResponse};
