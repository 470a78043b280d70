//! RGB status LED driver.
//!
//! One LEDC PWM channel (CH0) supplies the shared brightness rail; three
//! GPIO enables gate it onto the red, green and blue dies.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel and enable GPIOs via hw_init.
//! On host/test: writes land in hw_init's simulated duty register, and the
//! channel levels are mirrored in-memory.

use core::convert::Infallible;

use embedded_hal::pwm::SetDutyCycle;

use crate::drivers::hw_init;
use crate::pins;
use crate::ports::{DUTY_MAX, LedBus, LedChannel};

pub struct StatusLed {
    channels: [bool; 3],
}

impl StatusLed {
    pub fn new() -> Self {
        Self { channels: [false; 3] }
    }

    /// Last levels written to the enable GPIOs, as (red, green, blue).
    pub fn channel_levels(&self) -> (bool, bool, bool) {
        (self.channels[0], self.channels[1], self.channels[2])
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl LedBus for StatusLed {
    fn duty(&self) -> u16 {
        hw_init::ledc_read()
    }

    fn set_duty(&mut self, duty: u16) {
        hw_init::ledc_set(duty.min(DUTY_MAX));
    }

    fn set_channel(&mut self, channel: LedChannel, on: bool) {
        let (pin, idx) = match channel {
            LedChannel::Red => (pins::LED_R_EN_GPIO, 0),
            LedChannel::Green => (pins::LED_G_EN_GPIO, 1),
            LedChannel::Blue => (pins::LED_B_EN_GPIO, 2),
        };
        hw_init::gpio_write(pin, on);
        self.channels[idx] = on;
    }
}

// The brightness rail is also exposed through the standard PWM trait, so
// generic dimming code can drive it without knowing about LedBus.

impl embedded_hal::pwm::ErrorType for StatusLed {
    type Error = Infallible;
}

impl SetDutyCycle for StatusLed {
    fn max_duty_cycle(&self) -> u16 {
        DUTY_MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        LedBus::set_duty(self, duty);
        Ok(())
    }
}
