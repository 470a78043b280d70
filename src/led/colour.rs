//! Colour masks and the combined colour/duty write.
//!
//! A colour is a 3-bit enable mask over the LED channels; brightness lives
//! on the shared duty rail.  Bit layout follows the board schematic:
//! bit 0 = blue, bit 1 = green, bit 2 = red.

use crate::ports::{LedBus, LedChannel};

/// 3-bit channel enable mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourMask(u8);

impl ColourMask {
    pub const OFF: ColourMask = ColourMask(0b000);
    pub const BLUE: ColourMask = ColourMask(0b001);
    pub const GREEN: ColourMask = ColourMask(0b010);
    pub const RED: ColourMask = ColourMask(0b100);
    /// Red + green.
    pub const YELLOW: ColourMask = ColourMask(0b110);
    pub const WHITE: ColourMask = ColourMask(0b111);

    /// Build a mask from raw bits (only the low three bits are meaningful).
    pub const fn from_bits(bits: u8) -> Self {
        ColourMask(bits & 0b111)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn blue(self) -> bool {
        self.0 & 0b001 != 0
    }

    pub const fn green(self) -> bool {
        self.0 & 0b010 != 0
    }

    pub const fn red(self) -> bool {
        self.0 & 0b100 != 0
    }
}

/// Apply a colour mask and duty to the bus: duty first, then the three
/// channel enables in blue/green/red order.  No atomicity beyond call
/// order — the LED may show a partial state for the duration of the writes.
pub fn set_colour(bus: &mut impl LedBus, mask: ColourMask, duty: u16) {
    bus.set_duty(duty);
    bus.set_channel(LedChannel::Blue, mask.blue());
    bus.set_channel(LedChannel::Green, mask.green());
    bus.set_channel(LedChannel::Red, mask.red());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBus {
        duty: u16,
        red: bool,
        green: bool,
        blue: bool,
        duty_written_first: bool,
        channel_writes: u8,
    }

    impl FakeBus {
        fn new() -> Self {
            Self {
                duty: 0,
                red: false,
                green: false,
                blue: false,
                duty_written_first: false,
                channel_writes: 0,
            }
        }
    }

    impl LedBus for FakeBus {
        fn duty(&self) -> u16 {
            self.duty
        }

        fn set_duty(&mut self, duty: u16) {
            self.duty = duty;
            if self.channel_writes == 0 {
                self.duty_written_first = true;
            }
        }

        fn set_channel(&mut self, channel: LedChannel, on: bool) {
            self.channel_writes += 1;
            match channel {
                LedChannel::Red => self.red = on,
                LedChannel::Green => self.green = on,
                LedChannel::Blue => self.blue = on,
            }
        }
    }

    #[test]
    fn yellow_enables_red_and_green_only() {
        let mut bus = FakeBus::new();
        set_colour(&mut bus, ColourMask::YELLOW, 512);
        assert!(bus.red);
        assert!(bus.green);
        assert!(!bus.blue);
        assert_eq!(bus.duty, 512);
    }

    #[test]
    fn off_clears_every_channel() {
        let mut bus = FakeBus::new();
        set_colour(&mut bus, ColourMask::WHITE, 1023);
        set_colour(&mut bus, ColourMask::OFF, 1023);
        assert!(!bus.red && !bus.green && !bus.blue);
    }

    #[test]
    fn duty_is_written_before_channels() {
        let mut bus = FakeBus::new();
        set_colour(&mut bus, ColourMask::GREEN, 300);
        assert!(bus.duty_written_first);
        assert_eq!(bus.channel_writes, 3);
    }

    #[test]
    fn mask_bit_layout() {
        assert!(ColourMask::BLUE.blue());
        assert!(!ColourMask::BLUE.green());
        assert!(ColourMask::GREEN.green());
        assert!(ColourMask::RED.red());
        assert_eq!(ColourMask::from_bits(0b110), ColourMask::YELLOW);
        assert_eq!(ColourMask::from_bits(0xFF).bits(), 0b111);
    }
}
