//! Boot-time pack indicator displays.
//!
//! Each indicator reads the pack snapshot, maps it to a blink count, and
//! plays that count through the blink engine — one engine step per poll,
//! never blocking.  `poll()` returns `true` exactly once, on the call the
//! display completes; the engine is reset at that point so the caller can
//! hand it to the next indicator.
//!
//! Completion detection rides on the engine's cycle counter: the counter
//! ticks up when a cycle is armed, so `value > 1` means the pattern has
//! been shown in full once and a second run just began.

use log::{debug, info};

use crate::config::SystemConfig;
use crate::led::blink::{BlinkEngine, BlinkPattern};
use crate::led::colour::ColourMask;
use crate::ports::LedBus;

/// Pack measurement snapshot consumed by the indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStats {
    /// Lowest cell voltage in the pack, millivolts.
    pub mincell_mv: u16,
    /// Spread between the highest and lowest cell, millivolts.
    pub packdelta_mv: u16,
}

// Blink cadences are fixed per indicator; only the scaling factors are
// configurable.
const DELTA_ON_MS: u16 = 250;
const DELTA_OFF_MS: u16 = 250;
const DELTA_START_BLANK_MS: u16 = 750;
const DELTA_END_BLANK_MS: u16 = 500;

const VOLT_ON_MS: u16 = 250;
const VOLT_OFF_MS: u16 = 250;
const VOLT_START_BLANK_MS: u16 = 500;
const VOLT_END_BLANK_MS: u16 = 500;

// ── Cell imbalance ────────────────────────────────────────────

/// Yellow blink display: one blink per `delta_mv_per_blink` of pack
/// spread, rounded to nearest.  A spread under half a step shows no
/// blinks at all — the pattern collapses to its blanks.
pub struct DeltaIndicator {
    mv_per_blink: u16,
}

impl DeltaIndicator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            mv_per_blink: config.delta_mv_per_blink,
        }
    }

    /// Drive one poll of the display.  The blink count tracks the live
    /// reading; there is no latch, so the count shown is whatever the
    /// snapshot held when the cycle armed.
    pub fn poll(
        &mut self,
        engine: &mut BlinkEngine,
        bus: &mut impl LedBus,
        stats: &CellStats,
    ) -> bool {
        let per = u32::from(self.mv_per_blink);
        let count = (u32::from(stats.packdelta_mv) + per / 2) / per;
        let blinks = count.min(u32::from(u8::MAX)) as u8;

        engine.enable_cycle_count();
        engine.tick(
            bus,
            &BlinkPattern {
                blinks,
                colour: ColourMask::YELLOW,
                on_ms: DELTA_ON_MS,
                off_ms: DELTA_OFF_MS,
                start_blank_ms: DELTA_START_BLANK_MS,
                end_blank_ms: DELTA_END_BLANK_MS,
                fade_slope: 0,
            },
        );

        if engine.cycle_counter().value > 1 {
            engine.reset(bus);
            debug!("delta display: complete ({} blinks)", blinks);
            true
        } else {
            false
        }
    }
}

// ── Minimum cell voltage ──────────────────────────────────────

/// Green blink display: one blink per `cell_mv_per_blink` above the
/// voltage floor, plus one.  With the default 3000 mV floor and 200 mV
/// step: min cell under 3.2 V shows 1 blink, under 3.4 V shows 2, up to
/// the configured maximum.
///
/// The first `settle_ticks` polls do nothing — pack voltage sags under
/// load, and the reading needs a few loop iterations to recover before
/// it is worth latching.
pub struct VoltageIndicator {
    floor_mv: u16,
    mv_per_blink: u16,
    max_blinks: u8,
    settle_ticks: u8,
    waited: u8,
    latched: Option<u8>,
}

impl VoltageIndicator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            floor_mv: config.cell_floor_mv,
            mv_per_blink: config.cell_mv_per_blink,
            max_blinks: config.max_voltage_blinks,
            settle_ticks: config.settle_ticks,
            waited: 0,
            latched: None,
        }
    }

    fn blink_count(&self, mincell_mv: u16) -> u8 {
        // Readings below the floor clamp to one blink rather than wrapping.
        let steps =
            (i32::from(mincell_mv) - i32::from(self.floor_mv)) / i32::from(self.mv_per_blink);
        (steps + 1).clamp(1, i32::from(self.max_blinks)) as u8
    }

    /// Drive one poll of the display.  Returns `true` on the completing
    /// call, after which the indicator is ready for a fresh run.
    pub fn poll(
        &mut self,
        engine: &mut BlinkEngine,
        bus: &mut impl LedBus,
        stats: &CellStats,
    ) -> bool {
        if self.waited < self.settle_ticks {
            self.waited += 1;
            return false;
        }

        // Latched once per run so the displayed count holds still even if
        // the cell voltages drift mid-pattern.
        let blinks = match self.latched {
            Some(b) => b,
            None => {
                let b = self.blink_count(stats.mincell_mv);
                self.latched = Some(b);
                info!(
                    "voltage display: {} blinks (min cell {} mV)",
                    b, stats.mincell_mv
                );
                b
            }
        };

        engine.enable_cycle_count();
        engine.tick(
            bus,
            &BlinkPattern {
                blinks,
                colour: ColourMask::GREEN,
                on_ms: VOLT_ON_MS,
                off_ms: VOLT_OFF_MS,
                start_blank_ms: VOLT_START_BLANK_MS,
                end_blank_ms: VOLT_END_BLANK_MS,
                fade_slope: 0,
            },
        );

        if engine.cycle_counter().value > 1 {
            engine.reset(bus);
            self.waited = 0;
            self.latched = None;
            debug!("voltage display: complete");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{DUTY_MAX, LedChannel};

    struct FakeBus {
        duty: u16,
        channels: [bool; 3],
        on_edges: u32,
        writes: u32,
    }

    impl FakeBus {
        fn new() -> Self {
            Self {
                duty: DUTY_MAX,
                channels: [false; 3],
                on_edges: 0,
                writes: 0,
            }
        }

        fn lit(&self) -> bool {
            self.channels.iter().any(|&c| c)
        }
    }

    impl LedBus for FakeBus {
        fn duty(&self) -> u16 {
            self.duty
        }

        fn set_duty(&mut self, duty: u16) {
            self.duty = duty;
            self.writes += 1;
        }

        fn set_channel(&mut self, channel: LedChannel, on: bool) {
            let was_lit = self.lit();
            let idx = match channel {
                LedChannel::Red => 0,
                LedChannel::Green => 1,
                LedChannel::Blue => 2,
            };
            self.channels[idx] = on;
            self.writes += 1;
            if !was_lit && self.lit() {
                self.on_edges += 1;
            }
        }
    }

    fn config() -> SystemConfig {
        SystemConfig::default()
    }

    /// Poll the voltage display until it reports completion; returns the
    /// number of polls taken.
    fn run_voltage(
        ind: &mut VoltageIndicator,
        engine: &mut BlinkEngine,
        bus: &mut FakeBus,
        stats: &CellStats,
    ) -> u32 {
        let mut calls = 0;
        loop {
            calls += 1;
            assert!(calls < 5000, "voltage display never completed");
            if ind.poll(engine, bus, stats) {
                return calls;
            }
        }
    }

    fn run_delta(
        ind: &mut DeltaIndicator,
        engine: &mut BlinkEngine,
        bus: &mut FakeBus,
        stats: &CellStats,
    ) -> u32 {
        let mut calls = 0;
        loop {
            calls += 1;
            assert!(calls < 5000, "delta display never completed");
            if ind.poll(engine, bus, stats) {
                return calls;
            }
        }
    }

    #[test]
    fn settle_gate_holds_the_led_dark() {
        let cfg = config();
        let mut ind = VoltageIndicator::new(&cfg);
        let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
        let mut bus = FakeBus::new();
        let stats = CellStats {
            mincell_mv: 3500,
            packdelta_mv: 0,
        };

        for _ in 0..5 {
            assert!(!ind.poll(&mut engine, &mut bus, &stats));
        }
        assert_eq!(bus.writes, 0, "engine must not run during settling");
        assert!(!engine.is_active());

        // Sixth poll latches and starts the pattern.
        assert!(!ind.poll(&mut engine, &mut bus, &stats));
        assert!(engine.is_active());
    }

    #[test]
    fn voltage_count_scales_with_min_cell() {
        let cfg = config();
        // (mv, expected blinks): floor 3000, 200 mV per blink, max 6.
        for (mv, expected) in [(3500, 3), (3100, 1), (3900, 5)] {
            let mut ind = VoltageIndicator::new(&cfg);
            let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
            let mut bus = FakeBus::new();
            let stats = CellStats {
                mincell_mv: mv,
                packdelta_mv: 0,
            };
            run_voltage(&mut ind, &mut engine, &mut bus, &stats);
            assert_eq!(bus.on_edges, expected, "min cell {} mV", mv);
        }
    }

    #[test]
    fn voltage_count_clamps_at_both_ends() {
        let cfg = config();
        for (mv, expected) in [(2500, 1), (4500, 6)] {
            let mut ind = VoltageIndicator::new(&cfg);
            let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
            let mut bus = FakeBus::new();
            let stats = CellStats {
                mincell_mv: mv,
                packdelta_mv: 0,
            };
            run_voltage(&mut ind, &mut engine, &mut bus, &stats);
            assert_eq!(bus.on_edges, expected, "min cell {} mV", mv);
        }
    }

    #[test]
    fn latched_count_ignores_voltage_drift() {
        let cfg = config();
        let mut ind = VoltageIndicator::new(&cfg);
        let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
        let mut bus = FakeBus::new();

        let healthy = CellStats {
            mincell_mv: 3500,
            packdelta_mv: 0,
        };
        let sagging = CellStats {
            mincell_mv: 2800,
            packdelta_mv: 0,
        };

        // Settle and latch on the healthy reading.
        for _ in 0..6 {
            ind.poll(&mut engine, &mut bus, &healthy);
        }
        // Drift mid-display: the count must hold at 3.
        let mut finished = false;
        for _ in 0..5000 {
            if ind.poll(&mut engine, &mut bus, &sagging) {
                finished = true;
                break;
            }
        }
        assert!(finished);
        assert_eq!(bus.on_edges, 3);
    }

    #[test]
    fn voltage_finish_resets_everything() {
        let cfg = config();
        let mut ind = VoltageIndicator::new(&cfg);
        let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
        let mut bus = FakeBus::new();
        let stats = CellStats {
            mincell_mv: 3500,
            packdelta_mv: 0,
        };

        let first = run_voltage(&mut ind, &mut engine, &mut bus, &stats);
        assert!(!bus.lit());
        assert_eq!(bus.duty, DUTY_MAX);
        assert!(!engine.is_active());
        assert_eq!(engine.cycle_counter().value, 0);

        // Second run starts from scratch: settle gate and all.
        bus.on_edges = 0;
        let second = run_voltage(&mut ind, &mut engine, &mut bus, &stats);
        assert_eq!(bus.on_edges, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn delta_count_rounds_to_nearest() {
        let cfg = config();
        for (delta, expected) in [(74, 1), (100, 2), (25, 1)] {
            let mut ind = DeltaIndicator::new(&cfg);
            let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
            let mut bus = FakeBus::new();
            let stats = CellStats {
                mincell_mv: 3500,
                packdelta_mv: delta,
            };
            run_delta(&mut ind, &mut engine, &mut bus, &stats);
            assert_eq!(bus.on_edges, expected, "delta {} mV", delta);
        }
    }

    #[test]
    fn tiny_delta_shows_no_blinks_but_still_completes() {
        let cfg = config();
        let mut ind = DeltaIndicator::new(&cfg);
        let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
        let mut bus = FakeBus::new();
        let stats = CellStats {
            mincell_mv: 3500,
            packdelta_mv: 24,
        };

        run_delta(&mut ind, &mut engine, &mut bus, &stats);
        assert_eq!(bus.on_edges, 0);
        assert!(!bus.lit());
        assert!(!engine.is_active());
    }

    #[test]
    fn delta_has_no_settle_gate() {
        let cfg = config();
        let mut ind = DeltaIndicator::new(&cfg);
        let mut engine = BlinkEngine::new(cfg.tick_interval_ms);
        let mut bus = FakeBus::new();
        let stats = CellStats {
            mincell_mv: 3500,
            packdelta_mv: 80,
        };

        assert!(!ind.poll(&mut engine, &mut bus, &stats));
        assert!(engine.is_active(), "first poll must arm the engine");
    }
}
