//! PackLED Firmware — Main Entry Point
//!
//! Boot flow:
//!
//! ```text
//! hw_init ──▶ ConfigStore (NVS) ──▶ boot display ──▶ idle
//!                                   │
//!                                   ├─ green blinks: minimum cell voltage
//!                                   └─ yellow blinks: pack cell imbalance
//! ```
//!
//! The polling loop runs at `tick_interval_ms` and advances the blink
//! engine by at most one step per iteration; nothing in the loop blocks
//! beyond the tick delay itself.
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod pins;
pub mod ports;

pub mod indicators;
pub mod led;
mod drivers;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use config::SystemConfig;
use drivers::nvs::ConfigStore;
use drivers::status_led::StatusLed;
use indicators::{CellStats, DeltaIndicator, VoltageIndicator};
use led::blink::BlinkEngine;

#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::FreeRtos;

// ── Boot display sequencing ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayPhase {
    Voltage,
    Delta,
    Idle,
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
    }

    info!("╔══════════════════════════════════════╗");
    info!("║  PackLED v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let config = match ConfigStore::new() {
        Ok(store) => match store.load() {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), using defaults", e);
                SystemConfig::default()
            }
        },
        Err(e) => {
            warn!(
                "NVS init failed ({}), running with defaults and no persistence",
                e
            );
            SystemConfig::default()
        }
    };
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Stored config invalid ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 4. Construct the signalling stack ─────────────────────
    let mut led = StatusLed::new();
    let mut engine = BlinkEngine::new(config.tick_interval_ms);
    let mut voltage = VoltageIndicator::new(&config);
    let mut delta = DeltaIndicator::new(&config);

    // TODO: source CellStats from the pack-monitor AFE driver once the
    // I2C bring-up lands (pins are reserved in pins.rs).
    let stats = CellStats {
        mincell_mv: 3720,
        packdelta_mv: 80,
    };

    let mut phase = DisplayPhase::Voltage;
    info!("System ready. Entering polling loop.");

    // ── 5. Polling loop ───────────────────────────────────────
    loop {
        #[cfg(target_os = "espidf")]
        FreeRtos::delay_ms(u32::from(config.tick_interval_ms));

        // Simulated tick on non-espidf targets.
        #[cfg(not(target_os = "espidf"))]
        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            config.tick_interval_ms,
        )));

        match phase {
            DisplayPhase::Voltage => {
                if voltage.poll(&mut engine, &mut led, &stats) {
                    phase = DisplayPhase::Delta;
                }
            }
            DisplayPhase::Delta => {
                if delta.poll(&mut engine, &mut led, &stats) {
                    phase = DisplayPhase::Idle;
                    info!("Boot display complete; LED idle");
                }
            }
            DisplayPhase::Idle => {
                // Nothing scheduled: the LED stays dark until another
                // subsystem requests a display.
            }
        }
    }
}
