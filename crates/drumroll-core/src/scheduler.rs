//! Free-running retrigger clock.
//!
//! Once per frame the scheduler decides whether the held note should be
//! retriggered (note-off immediately followed by note-on). The period comes
//! from the rate parameter and is recomputed once per processed segment:
//!
//! ```text
//! rate <= 0   →  no retrigger (unbounded period)
//! rate >  0   →  round((1 - rate) * sample_rate) samples
//! ```
//!
//! A retrigger fires on the first frame where the counter exceeds the period,
//! so the distance between retriggers is `period + 1` frames. A period of 0
//! (rate 1) retriggers on every frame after the first.

/// Retrigger period in samples for a rate, or `None` for "never".
///
/// Rates above 1 saturate to a period of 0. NaN is treated as "never".
#[inline]
pub fn samples_between_notes(rate: f64, sample_rate: f64) -> Option<u64> {
    if rate > 0.0 {
        // Float-to-int `as` saturates: negative products become 0.
        Some(((1.0 - rate) * sample_rate).round() as u64)
    } else {
        None
    }
}

/// Per-frame retrigger state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetriggerScheduler {
    sample_counter: u64,
}

impl RetriggerScheduler {
    /// Create a scheduler with the counter at 0.
    pub const fn new() -> Self {
        Self { sample_counter: 0 }
    }

    /// Samples elapsed since the last retrigger.
    #[inline]
    pub const fn sample_counter(&self) -> u64 {
        self.sample_counter
    }

    /// Reset the counter to 0.
    #[inline]
    pub fn reset(&mut self) {
        self.sample_counter = 0;
    }

    /// Advance one frame. Returns `true` if a retrigger fires on this frame.
    ///
    /// With no note held the counter is pinned at 0 and nothing fires.
    /// Otherwise the counter is checked against `period`, reset on a
    /// retrigger, and then incremented.
    #[inline]
    pub fn tick(&mut self, note_held: bool, period: Option<u64>) -> bool {
        if !note_held {
            self.sample_counter = 0;
            return false;
        }

        let fire = matches!(period, Some(period) if self.sample_counter > period);
        if fire {
            self.sample_counter = 0;
        }
        self.sample_counter += 1;
        fire
    }
}
