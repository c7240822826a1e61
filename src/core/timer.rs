//! Millisecond Timers
//!
//! The console clock is a free-running `u32` millisecond counter that wraps
//! roughly every 49 days. Timers store the instant they were armed and their
//! budget, never an absolute deadline, so every check is re-derived with
//! wrapping subtraction and stays correct across counter overflow.

use serde::{Serialize, Deserialize};

/// Monotonic clock reading in milliseconds.
pub type Millis = u32;

/// Elapsed time between two clock readings, wraparound-safe.
#[inline]
pub fn elapsed_between(start: Millis, now: Millis) -> Millis {
    now.wrapping_sub(start)
}

/// A countdown armed at a clock reading.
///
/// A budget of `0` is the untimed sentinel: the timer never expires.
///
/// ```
/// use reflex_arcade::core::timer::Timer;
///
/// let timer = Timer::armed(u32::MAX - 10, 50);
/// assert!(!timer.expired(20));  // 31 ms elapsed across the wrap
/// assert!(timer.expired(39));   // 50 ms elapsed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    started_at: Millis,
    budget_ms: Millis,
}

impl Timer {
    /// Untimed budget.
    pub const UNTIMED: Millis = 0;

    /// Arm a timer at `now` with the given budget.
    pub const fn armed(now: Millis, budget_ms: Millis) -> Self {
        Self {
            started_at: now,
            budget_ms,
        }
    }

    /// Clock reading the timer was armed at.
    #[inline]
    pub fn started_at(&self) -> Millis {
        self.started_at
    }

    /// Configured budget.
    #[inline]
    pub fn budget(&self) -> Millis {
        self.budget_ms
    }

    /// Whether this timer never expires.
    #[inline]
    pub fn is_untimed(&self) -> bool {
        self.budget_ms == Self::UNTIMED
    }

    /// Time since the timer was armed.
    #[inline]
    pub fn elapsed(&self, now: Millis) -> Millis {
        elapsed_between(self.started_at, now)
    }

    /// Time left before expiry (`Millis::MAX` when untimed).
    #[inline]
    pub fn remaining(&self, now: Millis) -> Millis {
        if self.is_untimed() {
            return Millis::MAX;
        }
        self.budget_ms.saturating_sub(self.elapsed(now))
    }

    /// Whether the budget has been used up.
    #[inline]
    pub fn expired(&self, now: Millis) -> bool {
        !self.is_untimed() && self.elapsed(now) >= self.budget_ms
    }

    /// Whether a square wave with the given half-period is in its "on" half.
    ///
    /// Used for blinking display elements. A zero period is always on.
    pub fn blink_on(&self, now: Millis, half_period_ms: Millis) -> bool {
        if half_period_ms == 0 {
            return true;
        }
        (self.elapsed(now) / half_period_ms) % 2 == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================
