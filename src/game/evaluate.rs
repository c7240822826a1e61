//! Round Evaluator
//!
//! Decides, one input event at a time, whether the live round is won, lost
//! or still open. The rule is never touched; only [`RoundProgress`] advances.
//!
//! Time is always checked before button identity: a press that arrives
//! after its budget ran out loses even if it is the right button.

use serde::{Serialize, Deserialize};

use crate::core::timer::{Millis, Timer};
use crate::game::input::{Button, InputEvent};
use crate::game::rule::{RoundKind, RoundRule};

/// Why a round was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The budget ran out.
    Timeout,
    /// A button that does not match the next expected step.
    WrongButton,
    /// One of the forbidden buttons.
    ForbiddenButton,
    /// The same button twice in a chord.
    RepeatedButton,
}

/// Outcome of evaluating one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No decision yet.
    Pending,
    /// Round won.
    Success,
    /// Round lost.
    Failure(FailureReason),
}

impl Verdict {
    /// Whether the round is over.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Verdict::Pending)
    }
}

/// Evaluator-owned progress through the live round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundProgress {
    /// Steps matched so far (ordered and memory rounds).
    pub matched: usize,
    /// When the current step's budget started.
    pub step_started_at: Millis,
    /// First press of a chord, waiting for its partner.
    pub chord_first: Option<Button>,
}

impl RoundProgress {
    /// Progress for a round whose first step opens at `now`.
    pub fn started(now: Millis) -> Self {
        Self {
            matched: 0,
            step_started_at: now,
            chord_first: None,
        }
    }

    /// Budget currently running: the chord window once a partner is
    /// captured, otherwise the round window.
    pub fn active_timer(&self, rule: &RoundRule) -> Timer {
        let budget = match (&rule.kind, self.chord_first) {
            (RoundKind::ChordedPair { window_ms, .. }, Some(_)) => *window_ms,
            _ => rule.window_ms,
        };
        Timer::armed(self.step_started_at, budget)
    }
}

/// Evaluate one tick of the live round.
pub fn evaluate(
    now: Millis,
    rule: &RoundRule,
    progress: &mut RoundProgress,
    input: InputEvent,
) -> Verdict {
    if progress.active_timer(rule).expired(now) {
        return Verdict::Failure(FailureReason::Timeout);
    }

    let Some(button) = input.pressed() else {
        return Verdict::Pending;
    };

    match &rule.kind {
        RoundKind::SinglePress { expected, .. } => {
            if button == *expected {
                Verdict::Success
            } else {
                Verdict::Failure(FailureReason::WrongButton)
            }
        }
        RoundKind::ForbiddenPress { forbidden, expected } => {
            if forbidden.contains(&button) {
                Verdict::Failure(FailureReason::ForbiddenButton)
            } else if button == *expected {
                Verdict::Success
            } else {
                Verdict::Failure(FailureReason::WrongButton)
            }
        }
        RoundKind::OrderedPress { steps } | RoundKind::MemoryReplay { steps } => {
            advance_sequence(steps, now, progress, button)
        }
        RoundKind::ChordedPair { pair, .. } => match progress.chord_first {
            None => {
                // Any first press is held; the pair is judged on the partner.
                progress.chord_first = Some(button);
                progress.step_started_at = now;
                Verdict::Pending
            }
            Some(first) => {
                if button == first {
                    Verdict::Failure(FailureReason::RepeatedButton)
                } else if pair.contains(&first) && pair.contains(&button) {
                    Verdict::Success
                } else {
                    Verdict::Failure(FailureReason::WrongButton)
                }
            }
        },
    }
}

fn advance_sequence(
    steps: &[Button],
    now: Millis,
    progress: &mut RoundProgress,
    button: Button,
) -> Verdict {
    let Some(expected) = steps.get(progress.matched) else {
        // Nothing left to match; an empty sequence is trivially complete.
        return Verdict::Success;
    };

    if button != *expected {
        return Verdict::Failure(FailureReason::WrongButton);
    }

    progress.matched += 1;
    if progress.matched == steps.len() {
        Verdict::Success
    } else {
        progress.step_started_at = now;
        Verdict::Pending
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rule::{Cue, RoundRule};
    use proptest::prelude::*;

    fn rule(kind: RoundKind, window_ms: Millis) -> RoundRule {
        RoundRule {
            kind,
            window_ms,
            cue: Cue::default(),
            trick: None,
        }
    }

    fn press(button: Button) -> InputEvent {
        InputEvent::Pressed(button)
    }

    #[test]
    fn test_single_press_outcomes() {
        let rule = RoundRule::single(Button::Two, 500);

        let mut progress = RoundProgress::started(0);
        assert_eq!(evaluate(100, &rule, &mut progress, InputEvent::None), Verdict::Pending);
        assert_eq!(evaluate(200, &rule, &mut progress, press(Button::Two)), Verdict::Success);

        let mut progress = RoundProgress::started(0);
        assert_eq!(
            evaluate(200, &rule, &mut progress, press(Button::One)),
            Verdict::Failure(FailureReason::WrongButton)
        );
    }

    #[test]
    fn test_single_press_timeout_beats_correct_button() {
        let rule = RoundRule::single(Button::Two, 500);
        let mut progress = RoundProgress::started(1000);

        assert_eq!(
            evaluate(1500, &rule, &mut progress, press(Button::Two)),
            Verdict::Failure(FailureReason::Timeout)
        );
        assert_eq!(
            evaluate(1500, &rule, &mut progress, InputEvent::None),
            Verdict::Failure(FailureReason::Timeout)
        );
    }

    #[test]
    fn test_zero_window_never_times_out() {
        let rule = RoundRule::single(Button::One, 0);
        let mut progress = RoundProgress::started(0);

        for now in [0, 10_000, 1_000_000, u32::MAX] {
            assert_eq!(evaluate(now, &rule, &mut progress, InputEvent::None), Verdict::Pending);
        }
        assert_eq!(evaluate(u32::MAX, &rule, &mut progress, press(Button::One)), Verdict::Success);
    }

    #[test]
    fn test_window_across_clock_wrap() {
        let rule = RoundRule::single(Button::Three, 300);
        let mut progress = RoundProgress::started(u32::MAX - 100);

        assert_eq!(evaluate(150, &rule, &mut progress, InputEvent::None), Verdict::Pending);
        assert_eq!(
            evaluate(199, &rule, &mut progress, InputEvent::None),
            Verdict::Failure(FailureReason::Timeout)
        );
    }

    #[test]
    fn test_forbidden_press_outcomes() {
        let rule = rule(
            RoundKind::ForbiddenPress {
                forbidden: [Button::One, Button::Three],
                expected: Button::Two,
            },
            1000,
        );

        for (button, verdict) in [
            (Button::One, Verdict::Failure(FailureReason::ForbiddenButton)),
            (Button::Three, Verdict::Failure(FailureReason::ForbiddenButton)),
            (Button::Two, Verdict::Success),
        ] {
            let mut progress = RoundProgress::started(0);
            assert_eq!(evaluate(10, &rule, &mut progress, press(button)), verdict);
        }
    }

    #[test]
    fn test_ordered_pair_scenarios() {
        let rule = rule(
            RoundKind::OrderedPress {
                steps: vec![Button::One, Button::Three],
            },
            400,
        );

        // Second button first.
        let mut progress = RoundProgress::started(0);
        assert_eq!(
            evaluate(50, &rule, &mut progress, press(Button::Three)),
            Verdict::Failure(FailureReason::WrongButton)
        );

        // First button, then the step budget runs out.
        let mut progress = RoundProgress::started(0);
        assert_eq!(evaluate(300, &rule, &mut progress, press(Button::One)), Verdict::Pending);
        assert_eq!(progress.matched, 1);
        assert_eq!(evaluate(650, &rule, &mut progress, InputEvent::None), Verdict::Pending);
        assert_eq!(
            evaluate(700, &rule, &mut progress, press(Button::Three)),
            Verdict::Failure(FailureReason::Timeout)
        );

        // Both in order and in time; the step timer restarted at 300.
        let mut progress = RoundProgress::started(0);
        assert_eq!(evaluate(300, &rule, &mut progress, press(Button::One)), Verdict::Pending);
        assert_eq!(evaluate(650, &rule, &mut progress, press(Button::Three)), Verdict::Success);
    }

    #[test]
    fn test_memory_replay_mismatch_mid_sequence() {
        let rule = rule(
            RoundKind::MemoryReplay {
                steps: vec![Button::Two, Button::Two, Button::One],
            },
            1000,
        );
        let mut progress = RoundProgress::started(0);

        assert_eq!(evaluate(10, &rule, &mut progress, press(Button::Two)), Verdict::Pending);
        assert_eq!(
            evaluate(20, &rule, &mut progress, press(Button::Three)),
            Verdict::Failure(FailureReason::WrongButton)
        );
    }

    #[test]
    fn test_chord_outcomes() {
        let chord = rule(
            RoundKind::ChordedPair {
                pair: [Button::One, Button::Three],
                window_ms: 200,
            },
            1000,
        );

        let mut progress = RoundProgress::started(0);
        assert_eq!(evaluate(900, &chord, &mut progress, press(Button::Three)), Verdict::Pending);
        assert_eq!(progress.chord_first, Some(Button::Three));
        assert_eq!(evaluate(1050, &chord, &mut progress, press(Button::One)), Verdict::Success);

        let mut progress = RoundProgress::started(0);
        evaluate(10, &chord, &mut progress, press(Button::One));
        assert_eq!(
            evaluate(20, &chord, &mut progress, press(Button::One)),
            Verdict::Failure(FailureReason::RepeatedButton)
        );

        let mut progress = RoundProgress::started(0);
        evaluate(10, &chord, &mut progress, press(Button::One));
        assert_eq!(
            evaluate(210, &chord, &mut progress, press(Button::Three)),
            Verdict::Failure(FailureReason::Timeout)
        );
    }

    #[test]
    fn test_chord_second_press_outside_pair() {
        let chord = rule(
            RoundKind::ChordedPair {
                pair: [Button::One, Button::Two],
                window_ms: 200,
            },
            1000,
        );
        let mut progress = RoundProgress::started(0);

        evaluate(10, &chord, &mut progress, press(Button::Two));
        assert_eq!(
            evaluate(20, &chord, &mut progress, press(Button::Three)),
            Verdict::Failure(FailureReason::WrongButton)
        );
    }

    #[test]
    fn test_chord_first_press_outside_pair_is_held() {
        let chord = rule(
            RoundKind::ChordedPair {
                pair: [Button::One, Button::Three],
                window_ms: 200,
            },
            1000,
        );

        let mut progress = RoundProgress::started(0);
        assert_eq!(evaluate(10, &chord, &mut progress, press(Button::Two)), Verdict::Pending);
        assert_eq!(progress.chord_first, Some(Button::Two));
        assert_eq!(
            evaluate(20, &chord, &mut progress, press(Button::One)),
            Verdict::Failure(FailureReason::WrongButton)
        );

        let mut progress = RoundProgress::started(0);
        evaluate(10, &chord, &mut progress, press(Button::Two));
        assert_eq!(
            evaluate(211, &chord, &mut progress, InputEvent::None),
            Verdict::Failure(FailureReason::Timeout)
        );
    }

    #[test]
    fn test_pending_leaves_rule_untouched() {
        let original = rule(
            RoundKind::MemoryReplay {
                steps: vec![Button::One, Button::Two],
            },
            1000,
        );
        let copy = original.clone();
        let mut progress = RoundProgress::started(0);

        evaluate(5, &original, &mut progress, press(Button::One));
        assert_eq!(original, copy);
    }

    proptest! {
        #[test]
        fn prop_single_press_unique_success(target in 1u8..=3, pressed in 1u8..=3) {
            let target = Button::from_id(target).unwrap();
            let pressed = Button::from_id(pressed).unwrap();
            let rule = RoundRule::single(target, 1000);
            let mut progress = RoundProgress::started(0);

            let verdict = evaluate(10, &rule, &mut progress, InputEvent::Pressed(pressed));
            prop_assert_eq!(verdict == Verdict::Success, pressed == target);
            prop_assert!(verdict.is_terminal());
        }

        #[test]
        fn prop_sequence_prefix_is_pending(len in 1usize..16, seed in any::<u64>()) {
            let mut rng = crate::core::rng::DeterministicRng::new(seed);
            let steps: Vec<Button> = (0..len).map(|_| Button::random(&mut rng)).collect();
            let rule = rule(RoundKind::MemoryReplay { steps: steps.clone() }, 1000);
            let mut progress = RoundProgress::started(0);

            for (i, button) in steps.iter().enumerate() {
                let verdict = evaluate(10 * (i as u32 + 1), &rule, &mut progress, InputEvent::Pressed(*button));
                if i + 1 == len {
                    prop_assert_eq!(verdict, Verdict::Success);
                } else {
                    prop_assert_eq!(verdict, Verdict::Pending);
                    prop_assert_eq!(progress.matched, i + 1);
                }
            }
        }
    }
}
