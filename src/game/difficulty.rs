//! Difficulty Controller
//!
//! The reaction window shrinks by a fixed step after every success and
//! never re-expands within a game. It is restored only when a new game
//! starts.

use serde::{Serialize, Deserialize};

use crate::core::timer::Millis;
use crate::game::config::VariantTuning;

/// Current reaction window plus the tuning that drives it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    tuning: VariantTuning,
    window_ms: Millis,
}

impl Difficulty {
    /// Start at the tuning's opening window.
    pub fn new(tuning: VariantTuning) -> Self {
        Self {
            tuning,
            window_ms: tuning.start_ms,
        }
    }

    /// Current window.
    #[inline]
    pub fn window_ms(&self) -> Millis {
        self.window_ms
    }

    /// Restore the opening window (game start).
    pub fn reset(&mut self, tuning: VariantTuning) {
        self.tuning = tuning;
        self.window_ms = tuning.start_ms;
    }

    /// Shrink after a success, clamped to the floor. Returns the new window.
    ///
    /// An untimed window (0) stays untimed, and a timed one never shrinks
    /// into the untimed sentinel.
    pub fn on_success(&mut self) -> Millis {
        if self.window_ms == 0 {
            return 0;
        }
        let floor = self.tuning.floor_ms.min(self.window_ms).max(1);
        self.window_ms = self.window_ms.saturating_sub(self.tuning.step_ms).max(floor);
        self.window_ms
    }
}
