//! Hardware initialisation, the LED driver, and configuration storage.

pub mod hw_init;
pub mod nvs;
pub mod status_led;
