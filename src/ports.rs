//! Port traits — the boundary between the signalling core and the hardware.
//!
//! ```text
//!   Adapter (StatusLed / test mock) ──▶ LedBus ──▶ BlinkEngine (domain)
//! ```
//!
//! The blink engine and the indicator routines consume [`LedBus`] via
//! generics, so the signalling core never touches registers directly and
//! runs unchanged in host tests against a recording mock.

/// Full-scale PWM duty for the LED drive rail (10-bit LEDC timer).
pub const DUTY_MAX: u16 = 1023;

/// One of the three LED colour channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedChannel {
    Red,
    Green,
    Blue,
}

/// The RGB status LED as seen by the signalling core: one shared PWM duty
/// level (0–[`DUTY_MAX`]), three independent channel enables.
///
/// Brightness is global — colour is purely which channels are enabled.
pub trait LedBus {
    /// Current duty as last written to the PWM peripheral.
    fn duty(&self) -> u16;

    /// Write the shared PWM duty (0–[`DUTY_MAX`]).
    fn set_duty(&mut self, duty: u16);

    /// Enable or disable one colour channel.
    fn set_channel(&mut self, channel: LedChannel, on: bool);
}

/// Configuration storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No stored configuration (first boot)
    NotFound,
    /// Stored blob failed to deserialise
    Corrupted,
    /// Loaded or supplied values failed validation
    ValidationFailed(&'static str),
    /// Underlying storage I/O failed
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "configuration not found"),
            Self::Corrupted => write!(f, "configuration corrupted"),
            Self::ValidationFailed(why) => write!(f, "configuration invalid: {why}"),
            Self::IoError => write!(f, "configuration storage I/O error"),
        }
    }
}
