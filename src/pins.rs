//! GPIO / peripheral pin assignments for the PackLED controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Status LED (common-anode RGB, shared PWM brightness rail)
// ---------------------------------------------------------------------------

/// LEDC PWM output gating the common LED drive rail.
pub const LED_PWM_GPIO: i32 = 10;
/// Digital output: red channel enable (active HIGH).
pub const LED_R_EN_GPIO: i32 = 11;
/// Digital output: green channel enable (active HIGH).
pub const LED_G_EN_GPIO: i32 = 12;
/// Digital output: blue channel enable (active HIGH).
pub const LED_B_EN_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// I²C bus (battery AFE cell monitor — driver lands separately)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  10-bit gives 0 – 1023 duty levels.
pub const LED_PWM_RESOLUTION_BITS: u32 = 10;
/// LEDC base frequency for the LED drive rail (1 kHz — flicker-free).
pub const LED_PWM_FREQ_HZ: u32 = 1_000;
