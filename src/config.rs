//! System configuration parameters
//!
//! All tunable parameters for the PackLED signalling firmware.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Polling loop interval (milliseconds). One blink-engine tick.
    pub tick_interval_ms: u16,
    /// Polls to wait before latching a voltage reading (lets the pack
    /// measurement settle after wake)
    pub settle_ticks: u8,

    // --- Cell voltage display ---
    /// Voltage floor (mV): one blink signals a minimum cell at or below
    /// `cell_floor_mv + cell_mv_per_blink`
    pub cell_floor_mv: u16,
    /// Millivolts per additional blink above the floor
    pub cell_mv_per_blink: u16,
    /// Upper clamp on the voltage blink count
    pub max_voltage_blinks: u8,

    // --- Cell imbalance display ---
    /// Millivolts of pack delta per blink (rounded to nearest)
    pub delta_mv_per_blink: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 32, // matches the hardware timer quantum
            settle_ticks: 5,

            // Cell voltage display
            cell_floor_mv: 3000,
            cell_mv_per_blink: 200,
            max_voltage_blinks: 6,

            // Cell imbalance display
            delta_mv_per_blink: 50,
        }
    }
}

impl SystemConfig {
    /// Reject configurations the signalling code cannot run with.  Loaded
    /// blobs from NVS pass through here before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms is zero"));
        }
        if self.tick_interval_ms > 1000 {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms above 1000 ms starves the blink schedule",
            ));
        }
        if self.cell_mv_per_blink == 0 {
            return Err(ConfigError::ValidationFailed("cell_mv_per_blink is zero"));
        }
        if self.delta_mv_per_blink == 0 {
            return Err(ConfigError::ValidationFailed("delta_mv_per_blink is zero"));
        }
        if self.max_voltage_blinks == 0 {
            return Err(ConfigError::ValidationFailed("max_voltage_blinks is zero"));
        }
        if self.cell_floor_mv < 2000 || self.cell_floor_mv > 4000 {
            return Err(ConfigError::ValidationFailed(
                "cell_floor_mv outside the plausible Li-ion range",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.tick_interval_ms > 0);
        assert!(c.settle_ticks > 0);
        assert!(c.cell_mv_per_blink > 0);
        assert!(c.delta_mv_per_blink > 0);
        assert!(c.max_voltage_blinks > 0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_tick_interval_rejected() {
        let c = SystemConfig {
            tick_interval_ms: 0,
            ..SystemConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn zero_divisors_rejected() {
        let c = SystemConfig {
            cell_mv_per_blink: 0,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());

        let c = SystemConfig {
            delta_mv_per_blink: 0,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());

        let c = SystemConfig {
            max_voltage_blinks: 0,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn implausible_floor_rejected() {
        let c = SystemConfig {
            cell_floor_mv: 500,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.tick_interval_ms, c2.tick_interval_ms);
        assert_eq!(c.cell_floor_mv, c2.cell_floor_mv);
        assert_eq!(c.delta_mv_per_blink, c2.delta_mv_per_blink);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.cell_mv_per_blink, c2.cell_mv_per_blink);
        assert_eq!(c.max_voltage_blinks, c2.max_voltage_blinks);
        assert_eq!(c.settle_ticks, c2.settle_ticks);
    }
}
