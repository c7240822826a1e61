//! Frame Composition
//!
//! Turns the engine context into what the console should show right now:
//! four characters of text and a count of lit indicators. Pure function of
//! state and clock; calling it twice in the same tick gives the same frame.

use serde::{Serialize, Deserialize};

use crate::core::timer::{Millis, Timer};
use crate::game::config::EngineConfig;
use crate::game::rule::{RoundKind, Visibility};
use crate::game::state::{ActiveRound, EngineState, GameOverPhase, Mode, PlayPhase};
use crate::{DISPLAY_WIDTH, INDICATOR_COUNT};

/// One display refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Display text, normally four characters.
    pub text: String,
    /// Lit indicators, `0..=INDICATOR_COUNT`.
    pub indicators: u8,
}

impl Frame {
    /// Text with the indicator count clamped.
    pub fn new(text: impl Into<String>, indicators: u8) -> Self {
        Self {
            text: text.into(),
            indicators: indicators.min(INDICATOR_COUNT),
        }
    }

    /// Blank display, all indicators off.
    pub fn blank() -> Self {
        Self::new(" ".repeat(DISPLAY_WIDTH), 0)
    }
}

/// Right-justify a number in the display width. Wider numbers are not cut.
///
/// ```
/// use reflex_arcade::game::frame::format_number;
///
/// assert_eq!(format_number(7), "   7");
/// assert_eq!(format_number(65535), "65535");
/// ```
pub fn format_number(value: u32) -> String {
    format!("{:>width$}", value, width = DISPLAY_WIDTH)
}

/// Compose the frame for the current mode.
pub fn compose(state: &EngineState, now: Millis, config: &EngineConfig) -> Frame {
    match state.mode {
        Mode::Attract => {
            let cycle = Timer::armed(state.mode_entered_at, Timer::UNTIMED);
            let text = if cycle.blink_on(now, config.attract_cycle_ms) {
                state.variant.label().to_string()
            } else {
                format_number(state.high_scores.get(state.variant) as u32)
            };
            Frame::new(text, state.variant.index())
        }
        Mode::Playing(PlayPhase::Presenting { step, timer }) => {
            let shown = state
                .round()
                .and_then(|round| round.rule.kind.solution().get(step).copied());
            match shown {
                Some(button) if timer.elapsed(now) < config.memory_show_ms => {
                    Frame::new(slot_text(button.index(), button.digit()), 0)
                }
                _ => Frame::blank(),
            }
        }
        Mode::Playing(PlayPhase::Awaiting) => match state.round() {
            Some(round) => live_round(round, now, config),
            None => Frame::blank(),
        },
        Mode::Playing(PlayPhase::Interlude { .. }) => {
            Frame::new(format_number(state.session.score as u32), 0)
        }
        Mode::GameOver { phase, final_score, new_high_score } => {
            let indicators = if new_high_score { INDICATOR_COUNT } else { 0 };
            match phase {
                GameOverPhase::ShowScore { timer } => {
                    if timer.blink_on(now, config.gameover_blink_period_ms) {
                        Frame::new(format_number(final_score as u32), indicators)
                    } else {
                        Frame::new(" ".repeat(DISPLAY_WIDTH), indicators)
                    }
                }
                GameOverPhase::ShowHighScore { .. } => Frame::new(
                    format_number(state.high_scores.get(state.variant) as u32),
                    indicators,
                ),
            }
        }
    }
}

fn live_round(round: &ActiveRound, now: Millis, config: &EngineConfig) -> Frame {
    let rule = &round.rule;

    if let RoundKind::MemoryReplay { .. } = rule.kind {
        let matched = round.progress.matched.min(INDICATOR_COUNT as usize) as u8;
        return Frame::new(rule.cue.text.clone(), matched);
    }

    let shown = Timer::armed(round.started_at, Timer::UNTIMED);
    let visible = match rule.cue.visibility {
        Visibility::Steady => true,
        Visibility::Flash => shown.elapsed(now) < config.flash_ms,
        Visibility::Blink => shown.blink_on(now, config.blink_period_ms),
    };

    let text = match (&rule.cue.revealed, round.progress.matched) {
        (Some(revealed), matched) if matched >= 1 => revealed.clone(),
        _ if visible => rule.cue.text.clone(),
        _ => " ".repeat(DISPLAY_WIDTH),
    };

    Frame::new(text, time_bar(round.progress.active_timer(rule), now))
}

/// Remaining time as lit indicators, rounded up. Untimed rounds show all.
fn time_bar(timer: Timer, now: Millis) -> u8 {
    if timer.is_untimed() {
        return INDICATOR_COUNT;
    }
    let remaining = timer.remaining(now) as u64;
    let budget = timer.budget() as u64;
    let lit = (remaining * INDICATOR_COUNT as u64 + budget - 1) / budget;
    lit.min(INDICATOR_COUNT as u64) as u8
}

fn slot_text(slot: usize, glyph: char) -> String {
    (0..DISPLAY_WIDTH)
        .map(|i| if i == slot { glyph } else { ' ' })
        .collect()
}
