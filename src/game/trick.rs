//! Trick Stages
//!
//! The escalating game layers a "trick" over its basic side-reflex round.
//! Which trick is active is re-rolled from a fixed weighted table each time
//! the score enters a new bucket of `trick_step` points. The first bucket is
//! always plain so new players get a warm-up block.

use serde::{Serialize, Deserialize};

use crate::core::rng::RandomSource;

/// Weighted sub-behaviour of the escalating game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum TrickStage {
    /// Side cue, press that side.
    #[default]
    Plain = 0,
    /// Cue drawn at the opposite end, showing the real button digit.
    Swap = 1,
    /// Press the side opposite the cue.
    Invert = 2,
    /// Swap and invert together.
    SwapInvert = 3,
    /// Cue disappears after a brief flash.
    Flash = 4,
    /// Cue blinks.
    Blink = 5,
    /// Press the middle button.
    MidTarget = 6,
    /// Press two buttons together, any order.
    Chord = 7,
    /// Press two buttons in a fixed order.
    OrderedPair = 8,
    /// Half the usual window.
    ShortWindow = 9,
    /// Combine one or two behaviours, re-drawn every round.
    Mixed = 10,
}

/// Weighted table of stages. Weights sum to 100.
pub const TRICK_TABLE: [(TrickStage, u32); 11] = [
    (TrickStage::Plain, 15),
    (TrickStage::Swap, 10),
    (TrickStage::Invert, 10),
    (TrickStage::SwapInvert, 6),
    (TrickStage::Flash, 9),
    (TrickStage::Blink, 8),
    (TrickStage::MidTarget, 8),
    (TrickStage::Chord, 8),
    (TrickStage::OrderedPair, 8),
    (TrickStage::ShortWindow, 8),
    (TrickStage::Mixed, 10),
];

/// Pick an entry from a `(value, weight)` table with a single cumulative draw.
///
/// Returns `None` for an empty or all-zero table.
pub fn weighted_pick<T: Copy, R: RandomSource + ?Sized>(
    table: &[(T, u32)],
    rng: &mut R,
) -> Option<T> {
    let total: u32 = table.iter().map(|(_, weight)| *weight).sum();
    if total == 0 {
        return None;
    }

    let mut draw = rng.next_below(total);
    for (value, weight) in table {
        if draw < *weight {
            return Some(*value);
        }
        draw -= weight;
    }
    None
}

/// Shape of the challenge a trick round asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrickShape {
    /// Single press on button 1 or 3.
    #[default]
    Side,
    /// Single press on button 2.
    Mid,
    /// Two distinct presses, any order.
    Chord,
    /// Two presses in order.
    OrderedPair,
}

/// Concrete behaviour for one round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickPlan {
    /// Challenge shape.
    pub shape: TrickShape,
    /// Side cue drawn at the opposite end.
    pub swap: bool,
    /// Side cue means "press the other side".
    pub invert: bool,
    /// Cue only visible briefly.
    pub flash: bool,
    /// Cue blinks.
    pub blink: bool,
    /// Window halved.
    pub short_window: bool,
}

impl TrickPlan {
    /// Plan contributed by a single, non-mixed stage.
    pub fn for_stage(stage: TrickStage) -> Self {
        let mut plan = TrickPlan::default();
        match stage {
            TrickStage::Plain | TrickStage::Mixed => {}
            TrickStage::Swap => plan.swap = true,
            TrickStage::Invert => plan.invert = true,
            TrickStage::SwapInvert => {
                plan.swap = true;
                plan.invert = true;
            }
            TrickStage::Flash => plan.flash = true,
            TrickStage::Blink => plan.blink = true,
            TrickStage::MidTarget => plan.shape = TrickShape::Mid,
            TrickStage::Chord => plan.shape = TrickShape::Chord,
            TrickStage::OrderedPair => plan.shape = TrickShape::OrderedPair,
            TrickStage::ShortWindow => plan.short_window = true,
        }
        plan
    }

    /// Combine two plans. The first non-side shape wins; flags accumulate.
    pub fn merge(self, other: TrickPlan) -> TrickPlan {
        TrickPlan {
            shape: if self.shape == TrickShape::Side {
                other.shape
            } else {
                self.shape
            },
            swap: self.swap || other.swap,
            invert: self.invert || other.invert,
            flash: self.flash || other.flash,
            blink: self.blink || other.blink,
            short_window: self.short_window || other.short_window,
        }
    }
}

/// What the selector decided for one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrickRound {
    /// Stage in effect.
    pub stage: TrickStage,
    /// Resolved behaviour (differs from the stage only for `Mixed`).
    pub plan: TrickPlan,
    /// Whether the stage was chosen afresh this round.
    pub rerolled: bool,
}

/// Per-session trick state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickSelector {
    stage: TrickStage,
    last_bucket: Option<u32>,
    step: u16,
}

impl TrickSelector {
    /// Fresh selector with a bucket size (at least 1).
    pub fn new(step: u16) -> Self {
        Self {
            stage: TrickStage::Plain,
            last_bucket: None,
            step: step.max(1),
        }
    }

    /// Back to plain with no bucket chosen (session start).
    pub fn reset(&mut self, step: u16) {
        *self = Self::new(step);
    }

    /// Stage currently in effect.
    pub fn stage(&self) -> TrickStage {
        self.stage
    }

    /// Bucket the current stage was chosen for.
    pub fn last_bucket(&self) -> Option<u32> {
        self.last_bucket
    }

    /// Decide the behaviour for a round starting at `score`.
    pub fn next_round<R: RandomSource + ?Sized>(&mut self, score: u16, rng: &mut R) -> TrickRound {
        let bucket = score as u32 / self.step as u32;
        let rerolled = self.last_bucket != Some(bucket);

        if rerolled {
            self.stage = if bucket == 0 {
                TrickStage::Plain
            } else {
                weighted_pick(&TRICK_TABLE, rng).unwrap_or_default()
            };
            self.last_bucket = Some(bucket);
        }

        let plan = if self.stage == TrickStage::Mixed {
            mixed_plan(rng)
        } else {
            TrickPlan::for_stage(self.stage)
        };

        TrickRound {
            stage: self.stage,
            plan,
            rerolled,
        }
    }
}

/// One or two nested draws from the same table, merged.
fn mixed_plan<R: RandomSource + ?Sized>(rng: &mut R) -> TrickPlan {
    let draws = 1 + rng.next_below(2);
    let mut plan = TrickPlan::default();
    for _ in 0..draws {
        let stage = weighted_pick(&TRICK_TABLE, rng).unwrap_or_default();
        plan = plan.merge(TrickPlan::for_stage(stage));
    }
    plan
}

// =============================================================================
// TESTS
// =============================================================================
