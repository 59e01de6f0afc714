/// Countdown timer advanced by tick deltas
///
/// Fires when the elapsed delta reaches the remaining time, then reloads the
/// full interval. Leftover overshoot is discarded, so a late tick delays the
/// next firing rather than bunching them up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    remaining_ms: u32,
    interval_ms: u32,
}

impl IntervalTimer {
    /// Timer that first fires after a full `interval_ms`
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            remaining_ms: interval_ms,
            interval_ms,
        }
    }

    /// Advance by `elapsed_ms`, returning true when the timer fired
    pub fn poll(&mut self, elapsed_ms: u32) -> bool {
        if self.remaining_ms <= elapsed_ms {
            self.remaining_ms = self.interval_ms;
            true
        } else {
            self.remaining_ms -= elapsed_ms;
            false
        }
    }

    pub fn reset(&mut self) {
        self.remaining_ms = self.interval_ms;
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}
