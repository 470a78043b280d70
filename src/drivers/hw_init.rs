//! One-shot hardware peripheral initialization.
//!
//! Configures the LED channel-enable GPIOs and the LEDC PWM timer/channel
//! using raw ESP-IDF sys calls. Called once from `main()` before the
//! polling loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;
use crate::ports::DUTY_MAX;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the polling loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    SIM_DUTY.store(DUTY_MAX, Ordering::Relaxed);
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::LED_R_EN_GPIO,
        pins::LED_G_EN_GPIO,
        pins::LED_B_EN_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        // All colour channels start disabled: LED dark regardless of duty.
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin, if high { 1 } else { 0 }); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_LED: u32 = 0;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: shared LED brightness rail (1 kHz, 10-bit)
    // SAFETY: Called from single main-task context via init_peripherals().
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        freq_hz: pins::LED_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer0) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    // Channel 0: LED PWM, parked at full scale (dark while the channel
    // enables stay low, full brightness the instant one goes high).
    let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: ledc_channel_t_LEDC_CHANNEL_0,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: pins::LED_PWM_GPIO,
        duty: DUTY_MAX as u32,
        hpoint: 0,
        ..Default::default()
    }) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    info!("hw_init: LEDC configured (led=CH0, 10-bit)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(duty: u16) {
    // SAFETY: LEDC channel 0 was configured in init_ledc(); duty register
    // writes are race-free since only the main loop calls this function.
    unsafe {
        esp_idf_svc::sys::ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            LEDC_CH_LED,
            duty as u32,
        );
        esp_idf_svc::sys::ledc_update_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            LEDC_CH_LED,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(duty: u16) {
    SIM_DUTY.store(duty, Ordering::Relaxed);
}

/// Read back the duty currently programmed on the LED channel.  The fade
/// logic ramps off this value, so it must reflect the last `ledc_set`.
#[cfg(target_os = "espidf")]
pub fn ledc_read() -> u16 {
    // SAFETY: ledc_get_duty is a read-only register access on an
    // already-configured channel; safe to call from main context.
    (unsafe { ledc_get_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, LEDC_CH_LED) }) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_read() -> u16 {
    SIM_DUTY.load(Ordering::Relaxed)
}

// ── Host simulation hooks ─────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_DUTY: AtomicU16 = AtomicU16::new(DUTY_MAX);

/// Preload the simulated duty register (host tests only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_duty(duty: u16) {
    SIM_DUTY.store(duty, Ordering::Relaxed);
}
