//! Non-blocking blink pattern engine.
//!
//! Plays one pattern shape — starting blank, N on/off blinks, ending blank —
//! from a periodic polling loop.  The main loop calls `tick()` once per
//! polling interval; the engine advances its step schedule by at most one
//! step per call and writes colour/duty to the [`LedBus`] as side effects.
//! There are no blocking delays anywhere: waiting is "return with state
//! intact, resume next call."
//!
//! ## Step schedule
//!
//! Example for 3 blinks, on/off 500 ms, blanks 1000 ms:
//!
//! | Step | End time | LED |
//! |------|----------|-----|
//! | 0    | 1000     | off | (starting blank)
//! | 1    | 1500     | on  | (blink one)
//! | 2    | 2000     | off |
//! | 3    | 2500     | on  | (blink two)
//! | 4    | 3000     | off |
//! | 5    | 3500     | on  | (blink three)
//! | 6    | 4000     | off |
//! | 7    | 5000     | off | (ending blank)
//!
//! After the last step elapses the engine forces the LED off, disables its
//! tick counter, and goes idle until the next call re-arms it.
//!
//! ## Fades
//!
//! A non-zero fade slope ramps the shared duty rail by `slope` per call,
//! clamped to 0–1023.  When the ramp hits its end stop, the tick counter is
//! fast-forwarded to the current step deadline so the pattern does not dwell
//! dark (or pinned bright) for the remainder of the step.

use log::debug;

use crate::led::colour::{self, ColourMask};
use crate::ports::{DUTY_MAX, LedBus};

/// Elapsed-tick counter driving the step schedule.  One tick = one polling
/// interval.  Enabled while a pattern is playing; disabled and zeroed when
/// the pattern completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickCounter {
    pub value: u32,
    pub enabled: bool,
}

/// Completed-cycle counter consumed by the indicator routines.
///
/// Increments on pattern (re-)start and on single-blink fade completion,
/// not on the completion step itself — so `value > 1` reads as "a second
/// cycle has begun", i.e. the pattern has been shown in full once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounter {
    pub value: u32,
    pub enabled: bool,
}

/// One blink pattern.  Callers must keep the parameters stable for a full
/// cycle; varying them mid-cycle leaves the step schedule inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPattern {
    /// Number of on-phases.  Zero collapses the pattern to its blanks.
    pub blinks: u8,
    pub colour: ColourMask,
    pub on_ms: u16,
    pub off_ms: u16,
    pub start_blank_ms: u16,
    pub end_blank_ms: u16,
    /// Per-call duty ramp: negative fades out, positive fades in, zero
    /// leaves the duty rail at full brightness.
    pub fade_slope: i16,
}

/// The pattern state machine.  One instance per LED; all state lives in
/// named fields, so independent engines can drive independent LEDs.
pub struct BlinkEngine {
    tick_interval_ms: u32,
    tick: TickCounter,
    cycle: CycleCounter,
    step: u16,
    max_steps: u16,
    next_step_time: u32,
}

impl BlinkEngine {
    /// `tick_interval_ms` is the host loop's polling period — the real-time
    /// length of one tick.
    pub fn new(tick_interval_ms: u16) -> Self {
        Self {
            tick_interval_ms: u32::from(tick_interval_ms).max(1),
            tick: TickCounter::default(),
            cycle: CycleCounter::default(),
            step: 0,
            max_steps: 0,
            next_step_time: 0,
        }
    }

    /// Advance the pattern by one polling tick.
    ///
    /// Re-arms automatically when idle: the first call after completion (or
    /// after [`reset`](Self::reset)) starts a fresh cycle of `pattern`.
    pub fn tick(&mut self, bus: &mut impl LedBus, pattern: &BlinkPattern) {
        // Transitions write this duty so a fade-in restarts its ramp at
        // every step boundary.
        let starting_duty = if pattern.fade_slope > 0 { 0 } else { DUTY_MAX };

        if !self.tick.enabled {
            colour::set_colour(bus, ColourMask::OFF, starting_duty);
            self.tick.value = 0;
            self.tick.enabled = true;
            self.max_steps = 2 * u16::from(pattern.blinks) + 1;
            self.step = 0;
            self.next_step_time = u32::from(pattern.start_blank_ms);
            if self.cycle.enabled {
                self.cycle.value += 1;
            }
            debug!(
                "blink: start ({} blinks, cycle {})",
                pattern.blinks, self.cycle.value
            );
        }

        let elapsed_ms = self.tick.value.saturating_mul(self.tick_interval_ms);

        // At most one branch fires per call; priority order matters for the
        // degenerate zero-blink pattern, where step 0 is also second-to-last.
        if self.step == 0 && elapsed_ms > self.next_step_time {
            // Starting blank over.
            self.step += 1;
            if pattern.blinks != 0 {
                colour::set_colour(bus, pattern.colour, starting_duty);
            }
            self.next_step_time += u32::from(pattern.on_ms);
        } else if self.step + 1 == self.max_steps && elapsed_ms > self.next_step_time {
            // Into the ending blank.
            self.step += 1;
            colour::set_colour(bus, ColourMask::OFF, starting_duty);
            self.next_step_time += u32::from(pattern.end_blank_ms);
        } else if self.step == self.max_steps && elapsed_ms > self.next_step_time {
            // Cycle complete: LED off, engine idle until the next call.
            colour::set_colour(bus, ColourMask::OFF, starting_duty);
            self.tick.enabled = false;
            self.tick.value = 0;
            debug!("blink: cycle complete");
        } else if self.step % 2 != 0 && elapsed_ms > self.next_step_time {
            // Odd step (an on-phase) over: blink off.
            self.step += 1;
            colour::set_colour(bus, ColourMask::OFF, starting_duty);
            self.next_step_time += u32::from(pattern.off_ms);
        } else if self.step % 2 == 0 && elapsed_ms > self.next_step_time {
            // Even step (an off-phase) over: blink on.
            self.step += 1;
            colour::set_colour(bus, pattern.colour, starting_duty);
            self.next_step_time += u32::from(pattern.on_ms);
        }

        // Fade phase, independent of the step logic, on the duty value read
        // back from the bus.
        let current = i32::from(bus.duty());
        let slope = i32::from(pattern.fade_slope);
        if slope < 0 {
            if current > -slope {
                bus.set_duty((current + slope) as u16);
            } else {
                bus.set_duty(0);
                // Fade-out done: skip the rest of this step's dwell.
                self.tick.value = self.next_step_time / self.tick_interval_ms;
                if pattern.blinks == 1 {
                    self.finish_single_blink_fade();
                }
            }
        } else if slope > 0 {
            if current + slope < i32::from(DUTY_MAX) {
                bus.set_duty((current + slope) as u16);
            } else {
                bus.set_duty(DUTY_MAX);
                // One extra tick: the clamping call above settles at max.
                self.tick.value = self.next_step_time / self.tick_interval_ms + 1;
                if pattern.blinks == 1 {
                    self.finish_single_blink_fade();
                }
            }
        }

        if self.tick.enabled {
            self.tick.value = self.tick.value.saturating_add(1);
        }
    }

    /// Cancel any in-progress pattern: LED off at full duty, both counters
    /// disabled and zeroed.  Step state is left as-is; the next `tick()`
    /// re-initialises it.
    pub fn reset(&mut self, bus: &mut impl LedBus) {
        colour::set_colour(bus, ColourMask::OFF, DUTY_MAX);
        self.tick = TickCounter::default();
        self.cycle = CycleCounter::default();
    }

    /// Start counting pattern cycles (see [`CycleCounter`]).
    pub fn enable_cycle_count(&mut self) {
        self.cycle.enabled = true;
    }

    pub fn tick_counter(&self) -> &TickCounter {
        &self.tick
    }

    pub fn cycle_counter(&self) -> &CycleCounter {
        &self.cycle
    }

    /// Whether a pattern is currently playing.
    pub fn is_active(&self) -> bool {
        self.tick.enabled
    }

    // Single-blink fade patterns finish here, on the call the ramp ends,
    // instead of dwelling one tick dark before the completion step.
    fn finish_single_blink_fade(&mut self) {
        self.tick.enabled = false;
        self.tick.value = 0;
        if self.cycle.enabled {
            self.cycle.value += 1;
        }
        debug!("blink: single-blink fade complete");
    }
}
