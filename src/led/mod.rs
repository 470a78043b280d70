//! Status-LED signalling core: colour gating and the non-blocking blink
//! pattern engine.  Hardware-independent; everything here talks to the LED
//! through [`crate::ports::LedBus`].

pub mod blink;
pub mod colour;
