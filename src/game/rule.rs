//! Round Rules
//!
//! A [`RoundRule`] is the contract for one round: what the player must press,
//! how long they have, and what the display shows. A fresh rule is generated
//! at the start of every round by [`generate`] and never changes afterwards;
//! the evaluator keeps its own progress alongside it.

use serde::{Serialize, Deserialize};

use crate::core::rng::RandomSource;
use crate::core::timer::Millis;
use crate::game::config::EngineConfig;
use crate::game::input::Button;
use crate::game::state::Session;
use crate::game::trick::{TrickPlan, TrickShape, TrickStage};
use crate::game::variant::GameVariant;
use crate::DISPLAY_WIDTH;

// =============================================================================
// RULE TYPES
// =============================================================================

/// What the player must do this round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundKind {
    /// Press `expected`. `position` is the display slot the cue is drawn in;
    /// it never affects which button is correct.
    SinglePress {
        /// Correct button.
        expected: Button,
        /// Display slot hint (0..4).
        position: u8,
    },
    /// Press the one button that is not forbidden.
    ForbiddenPress {
        /// Forbidden buttons, ascending.
        forbidden: [Button; 2],
        /// The remaining button.
        expected: Button,
    },
    /// Press the steps in order, each within the round window.
    OrderedPress {
        /// Expected presses.
        steps: Vec<Button>,
    },
    /// Press both buttons of the pair, any order, the second within
    /// `window_ms` of the first.
    ChordedPair {
        /// The two buttons, ascending.
        pair: [Button; 2],
        /// Budget between the two presses.
        window_ms: Millis,
    },
    /// Replay the memorized sequence, each step within the round window.
    MemoryReplay {
        /// The full sequence.
        steps: Vec<Button>,
    },
}

impl RoundKind {
    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::SinglePress { .. } => "single",
            RoundKind::ForbiddenPress { .. } => "forbidden",
            RoundKind::OrderedPress { .. } => "ordered",
            RoundKind::ChordedPair { .. } => "chord",
            RoundKind::MemoryReplay { .. } => "memory",
        }
    }

    /// Number of presses a correct answer takes.
    pub fn press_count(&self) -> usize {
        match self {
            RoundKind::SinglePress { .. } | RoundKind::ForbiddenPress { .. } => 1,
            RoundKind::OrderedPress { steps } | RoundKind::MemoryReplay { steps } => steps.len(),
            RoundKind::ChordedPair { .. } => 2,
        }
    }

    /// One sequence of presses that wins the round.
    pub fn solution(&self) -> Vec<Button> {
        match self {
            RoundKind::SinglePress { expected, .. }
            | RoundKind::ForbiddenPress { expected, .. } => vec![*expected],
            RoundKind::OrderedPress { steps } | RoundKind::MemoryReplay { steps } => steps.clone(),
            RoundKind::ChordedPair { pair, .. } => pair.to_vec(),
        }
    }
}

/// How the cue behaves over time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Always shown.
    #[default]
    Steady,
    /// Shown for the configured flash time, then blank.
    Flash,
    /// Toggles every blink half-period.
    Blink,
}

/// What the display shows while the round is live.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    /// Four-character cue.
    pub text: String,
    /// Replaces `text` once the first step of an ordered round is matched.
    pub revealed: Option<String>,
    /// Time behaviour.
    pub visibility: Visibility,
}

impl Cue {
    fn steady(text: String) -> Self {
        Self {
            text,
            revealed: None,
            visibility: Visibility::Steady,
        }
    }
}

/// The contract for the current round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRule {
    /// Challenge.
    pub kind: RoundKind,
    /// Reaction budget (per step for multi-step rounds). `0` = untimed.
    pub window_ms: Millis,
    /// Presentation.
    pub cue: Cue,
    /// Trick stage this round was built under (escalating game only).
    pub trick: Option<TrickStage>,
}

impl RoundRule {
    /// Single press with the cue aligned to its button.
    pub fn single(expected: Button, window_ms: Millis) -> Self {
        Self {
            kind: RoundKind::SinglePress {
                expected,
                position: expected.index() as u8,
            },
            window_ms,
            cue: Cue::steady(slot_text(expected.index(), expected.digit())),
            trick: None,
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Build the rule for the next round of `variant`.
///
/// Mutates the session only where the variant keeps cross-round state: the
/// memory sequence grows by one element and the trick selector may re-roll.
pub fn generate<R: RandomSource + ?Sized>(
    variant: GameVariant,
    session: &mut Session,
    rng: &mut R,
    config: &EngineConfig,
) -> RoundRule {
    let window_ms = session.difficulty.window_ms();

    match variant {
        GameVariant::ClassicReflex => {
            let expected = Button::random(rng);
            let position = expected.index();
            single_press(expected, position, window_ms)
        }
        GameVariant::HardReflex => {
            let expected = Button::random(rng);
            let position = rng.next_below(DISPLAY_WIDTH as u32) as usize;
            single_press(expected, position, window_ms)
        }
        GameVariant::ForbiddenPress => forbidden_press(rng, window_ms),
        GameVariant::ChordedMemory => {
            session.memory.extend(rng);
            RoundRule {
                kind: RoundKind::MemoryReplay {
                    steps: session.memory.steps().to_vec(),
                },
                window_ms,
                cue: Cue::steady("----".to_string()),
                trick: None,
            }
        }
        GameVariant::EscalatingTrick => {
            let round = session.tricks.next_round(session.score, rng);
            let mut rule = trick_round(round.plan, rng, window_ms, config);
            rule.trick = Some(round.stage);
            rule
        }
    }
}

fn single_press(expected: Button, position: usize, window_ms: Millis) -> RoundRule {
    RoundRule {
        kind: RoundKind::SinglePress {
            expected,
            position: position as u8,
        },
        window_ms,
        cue: Cue::steady(slot_text(position, expected.digit())),
        trick: None,
    }
}

fn forbidden_press<R: RandomSource + ?Sized>(rng: &mut R, window_ms: Millis) -> RoundRule {
    let mut forbidden = Button::distinct_pair(rng);
    forbidden.sort();
    let expected = Button::remaining(forbidden);

    RoundRule {
        kind: RoundKind::ForbiddenPress { forbidden, expected },
        window_ms,
        cue: Cue::steady(format!("-{}-{}", forbidden[0].digit(), forbidden[1].digit())),
        trick: None,
    }
}

fn trick_round<R: RandomSource + ?Sized>(
    plan: TrickPlan,
    rng: &mut R,
    window_ms: Millis,
    config: &EngineConfig,
) -> RoundRule {
    let window_ms = if plan.short_window && window_ms != 0 {
        (window_ms / 2).max(1)
    } else {
        window_ms
    };

    let (kind, text, revealed) = match plan.shape {
        TrickShape::Side => {
            let side = if rng.next_below(2) == 0 {
                Button::One
            } else {
                Button::Three
            };
            let expected = if plan.invert { side.opposite() } else { side };

            let side_slot = if side == Button::One { 0 } else { DISPLAY_WIDTH - 1 };
            let slot = if plan.swap {
                DISPLAY_WIDTH - 1 - side_slot
            } else {
                side_slot
            };
            let glyph = if plan.swap { side.digit() } else { '#' };

            let mut cells = [' '; DISPLAY_WIDTH];
            cells[slot] = glyph;
            if plan.invert {
                cells[1] = '-';
                cells[2] = '-';
            }

            let kind = RoundKind::SinglePress {
                expected,
                position: slot as u8,
            };
            (kind, cells.iter().collect(), None)
        }
        TrickShape::Mid => {
            let kind = RoundKind::SinglePress {
                expected: Button::Two,
                position: 1,
            };
            (kind, " ## ".to_string(), None)
        }
        TrickShape::Chord => {
            let mut pair = Button::distinct_pair(rng);
            pair.sort();
            let kind = RoundKind::ChordedPair {
                pair,
                window_ms: config.chord_window_ms,
            };
            (kind, format!("{}+{} ", pair[0].digit(), pair[1].digit()), None)
        }
        TrickShape::OrderedPair => {
            let [first, second] = Button::distinct_pair(rng);
            let kind = RoundKind::OrderedPress {
                steps: vec![first, second],
            };
            (
                kind,
                format!("{}-  ", first.digit()),
                Some(format!("{}-{} ", first.digit(), second.digit())),
            )
        }
    };

    let visibility = if plan.flash {
        Visibility::Flash
    } else if plan.blink {
        Visibility::Blink
    } else {
        Visibility::Steady
    };

    RoundRule {
        kind,
        window_ms,
        cue: Cue {
            text,
            revealed,
            visibility,
        },
        trick: None,
    }
}

/// Blank display with one glyph in `slot`.
fn slot_text(slot: usize, glyph: char) -> String {
    (0..DISPLAY_WIDTH)
        .map(|i| if i == slot { glyph } else { ' ' })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
