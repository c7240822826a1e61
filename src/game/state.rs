//! Engine State Definitions
//!
//! The single engine context: top-level mode, the selected variant, the
//! session being played, the live round (if any), cached high scores and the
//! random source. One `EngineState` drives one console; nothing here is
//! global, so several engines can run side by side.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::core::timer::{Millis, Timer};
use crate::game::config::EngineConfig;
use crate::game::difficulty::Difficulty;
use crate::game::evaluate::RoundProgress;
use crate::game::events::GameEvent;
use crate::game::memory::MemorySequence;
use crate::game::rule::RoundRule;
use crate::game::scores::HighScoreTable;
use crate::game::trick::TrickSelector;
use crate::game::variant::GameVariant;

// =============================================================================
// MODES
// =============================================================================

/// Sub-phase of active play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayPhase {
    /// Memory playback: element `step` is shown, then a blank gap.
    Presenting {
        /// Index of the element being shown.
        step: usize,
        /// Armed for show + gap.
        timer: Timer,
    },
    /// The round is live and the evaluator runs every tick.
    Awaiting,
    /// Pause after a success before the next round.
    Interlude {
        /// Pause timer.
        timer: Timer,
    },
}

/// Sub-phase of the game-over summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverPhase {
    /// Final score blinking.
    ShowScore {
        /// Display timer.
        timer: Timer,
    },
    /// High score shown before returning to attract.
    ShowHighScore {
        /// Display timer.
        timer: Timer,
    },
}

/// Top-level mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum Mode {
    /// Game selector.
    #[default]
    Attract,
    /// A session is running.
    Playing(PlayPhase),
    /// Summary after a loss.
    GameOver {
        /// Display sub-phase.
        phase: GameOverPhase,
        /// Score the session ended with.
        final_score: u16,
        /// Whether the score beat the stored high score.
        new_high_score: bool,
    },
}

/// Mode without its payload, for events and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModeKind {
    /// Selector.
    Attract = 0,
    /// Playing.
    Playing = 1,
    /// Game over.
    GameOver = 2,
}

impl Mode {
    /// Payload-free kind.
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Attract => ModeKind::Attract,
            Mode::Playing(_) => ModeKind::Playing,
            Mode::GameOver { .. } => ModeKind::GameOver,
        }
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.kind() as u8);
        match self {
            Mode::Attract => {}
            Mode::Playing(phase) => match phase {
                PlayPhase::Presenting { step, timer } => {
                    hasher.update_u8(0);
                    hasher.update_u32(*step as u32);
                    hash_timer(hasher, timer);
                }
                PlayPhase::Awaiting => hasher.update_u8(1),
                PlayPhase::Interlude { timer } => {
                    hasher.update_u8(2);
                    hash_timer(hasher, timer);
                }
            },
            Mode::GameOver { phase, final_score, new_high_score } => {
                match phase {
                    GameOverPhase::ShowScore { timer } => {
                        hasher.update_u8(0);
                        hash_timer(hasher, timer);
                    }
                    GameOverPhase::ShowHighScore { timer } => {
                        hasher.update_u8(1);
                        hash_timer(hasher, timer);
                    }
                }
                hasher.update_u16(*final_score);
                hasher.update_bool(*new_high_score);
            }
        }
    }
}

fn hash_timer(hasher: &mut StateHasher, timer: &Timer) {
    hasher.update_u32(timer.started_at());
    hasher.update_u32(timer.budget());
}

// =============================================================================
// SESSION
// =============================================================================

/// Per-game state, reset whenever a new game starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Rounds won this game (saturating).
    pub score: u16,
    /// Reaction window controller.
    pub difficulty: Difficulty,
    /// Memory game sequence.
    pub memory: MemorySequence,
    /// Escalating game stage selector.
    pub tricks: TrickSelector,
}

impl Session {
    /// Idle session for the default variant.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            score: 0,
            difficulty: Difficulty::new(config.tuning(GameVariant::default())),
            memory: MemorySequence::new(config.memory_max_len),
            tricks: TrickSelector::new(config.trick_step),
        }
    }

    /// Reset everything for a fresh game of `variant`.
    pub fn begin(&mut self, variant: GameVariant, config: &EngineConfig) {
        self.score = 0;
        self.difficulty.reset(config.tuning(variant));
        self.memory = MemorySequence::new(config.memory_max_len);
        self.tricks.reset(config.trick_step);
    }

    /// Count a won round.
    pub fn add_point(&mut self) -> u16 {
        self.score = self.score.saturating_add(1);
        self.score
    }
}

// =============================================================================
// ACTIVE ROUND
// =============================================================================

/// The round currently being played.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRound {
    /// Immutable contract.
    pub rule: RoundRule,
    /// Evaluator progress.
    pub progress: RoundProgress,
    /// Clock reading the round went live (after playback for memory).
    pub started_at: Millis,
}

impl ActiveRound {
    /// Wrap a fresh rule whose first step opens at `now`.
    pub fn new(rule: RoundRule, now: Millis) -> Self {
        Self {
            rule,
            progress: RoundProgress::started(now),
            started_at: now,
        }
    }
}

// =============================================================================
// ENGINE STATE
// =============================================================================

/// Complete engine context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineState {
    /// Current mode
    pub mode: Mode,

    /// Selected (or playing) variant
    pub variant: GameVariant,

    /// Session data
    pub session: Session,

    /// Live round; `None` outside `Playing`
    pub round: Option<ActiveRound>,

    /// Cached high scores
    pub high_scores: HighScoreTable,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Clock reading when the current mode was entered
    pub mode_entered_at: Millis,

    /// Clock reading of the latest tick
    pub now: Millis,

    /// Events generated this tick (drained each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl EngineState {
    /// Fresh engine in attract mode.
    pub fn new(rng_seed: u64, config: &EngineConfig) -> Self {
        Self {
            mode: Mode::Attract,
            variant: GameVariant::default(),
            session: Session::new(config),
            round: None,
            high_scores: HighScoreTable::new(),
            rng: DeterministicRng::new(rng_seed),
            rng_seed,
            mode_entered_at: 0,
            now: 0,
            pending_events: Vec::new(),
        }
    }

    /// Fresh engine with a preloaded high-score table, entering attract at `now`.
    pub fn with_high_scores(
        rng_seed: u64,
        config: &EngineConfig,
        high_scores: HighScoreTable,
        now: Millis,
    ) -> Self {
        let mut state = Self::new(rng_seed, config);
        state.high_scores = high_scores;
        state.mode_entered_at = now;
        state.now = now;
        state
    }

    /// Live round, if any.
    pub fn round(&self) -> Option<&ActiveRound> {
        self.round.as_ref()
    }

    /// Whether a session is running.
    pub fn is_playing(&self) -> bool {
        matches!(self.mode, Mode::Playing(_))
    }

    /// Compute hash of current state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.now, self.rng_seed, |hasher| {
            self.mode.hash_into(hasher);
            hasher.update_u8(self.variant.index());
            hasher.update_u32(self.mode_entered_at);

            // Session
            hasher.update_u16(self.session.score);
            hasher.update_u32(self.session.difficulty.window_ms());
            hasher.update_u32(self.session.memory.len() as u32);
            for step in self.session.memory.steps() {
                hasher.update_u8(step.id());
            }
            hasher.update_u8(self.session.tricks.stage() as u8);
            hasher.update_u32(self.session.tricks.last_bucket().unwrap_or(u32::MAX));

            // Live round
            hasher.update_bool(self.round.is_some());
            if let Some(round) = &self.round {
                hasher.update_str(round.rule.kind.label());
                for button in round.rule.kind.solution() {
                    hasher.update_u8(button.id());
                }
                hasher.update_u32(round.rule.window_ms);
                hasher.update_str(&round.rule.cue.text);
                hasher.update_u32(round.progress.matched as u32);
                hasher.update_u32(round.progress.step_started_at);
                hasher.update_u8(round.progress.chord_first.map_or(0, |b| b.id()));
                hasher.update_u32(round.started_at);
            }

            for variant in GameVariant::ALL {
                hasher.update_u16(self.high_scores.get(variant));
            }

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push an event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::Button;

    #[test]
    fn test_new_engine_in_attract() {
        let config = EngineConfig::default();
        let state = EngineState::new(42, &config);

        assert_eq!(state.mode, Mode::Attract);
        assert_eq!(state.mode.kind(), ModeKind::Attract);
        assert!(state.round().is_none());
        assert_eq!(state.session.score, 0);
    }

    #[test]
    fn test_session_begin_resets() {
        let config = EngineConfig::default();
        let mut session = Session::new(&config);
        session.score = 9;
        session.difficulty.on_success();

        session.begin(GameVariant::HardReflex, &config);
        assert_eq!(session.score, 0);
        assert_eq!(session.difficulty.window_ms(), config.hard.start_ms);
        assert!(session.memory.is_empty());
        assert_eq!(session.tricks.last_bucket(), None);
    }

    #[test]
    fn test_score_saturates() {
        let config = EngineConfig::default();
        let mut session = Session::new(&config);
        session.score = u16::MAX - 1;

        assert_eq!(session.add_point(), u16::MAX);
        assert_eq!(session.add_point(), u16::MAX);
    }

    #[test]
    fn test_engine_hash_determinism() {
        let config = EngineConfig::default();
        let state1 = EngineState::new(12345, &config);
        let state2 = EngineState::new(12345, &config);
        assert_eq!(state1.compute_hash(), state2.compute_hash());

        let mut state3 = EngineState::new(12345, &config);
        state3.round = Some(ActiveRound::new(RoundRule::single(Button::One, 500), 0));
        assert_ne!(state1.compute_hash(), state3.compute_hash());

        let state4 = EngineState::new(54321, &config);
        assert_ne!(state1.compute_hash(), state4.compute_hash());
    }
}
