//! PackLED firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod config;
pub mod indicators;
pub mod led;
pub mod ports;

mod pins;

// ESP-IDF-backed modules; host builds get the simulation shims inside.
pub mod drivers;
