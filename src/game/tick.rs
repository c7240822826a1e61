//! Engine Tick
//!
//! The cooperative state machine. The driver calls [`tick`] once per poll
//! with at most one input event and the current clock reading; the handler
//! for the current mode does a bounded amount of work and returns. Nothing
//! in here blocks: every timed display sequence is a sub-phase carrying its
//! own [`Timer`].
//!
//! Given the same seed, config and input stream, a run is bit-for-bit
//! reproducible, which is what [`replay_session`] relies on.

use tracing::{debug, info, warn};

use crate::console::storage::ScoreStore;
use crate::core::timer::{Millis, Timer};
use crate::game::config::EngineConfig;
use crate::game::evaluate::{evaluate, FailureReason, RoundProgress, Verdict};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::frame::{compose, Frame};
use crate::game::input::{Button, InputEvent, InputRecording};
use crate::game::rule::{generate, RoundKind};
use crate::game::state::{ActiveRound, EngineState, GameOverPhase, Mode, PlayPhase};
use crate::game::variant::GameVariant;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// What the display should show after this tick
    pub frame: Frame,
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Whether the top-level mode changed this tick
    pub mode_changed: bool,
}

/// Run one engine tick.
///
/// # Arguments
///
/// * `state` - The engine context (will be mutated)
/// * `input` - At most one button event sampled this poll
/// * `now` - Free-running millisecond clock
/// * `config` - Timing configuration
/// * `store` - High-score persistence, touched only on game over
pub fn tick<S: ScoreStore + ?Sized>(
    state: &mut EngineState,
    input: InputEvent,
    now: Millis,
    config: &EngineConfig,
    store: &mut S,
) -> TickResult {
    state.now = now;
    let mode_before = state.mode.kind();

    match state.mode {
        Mode::Attract => attract_tick(state, input, now, config),
        Mode::Playing(phase) => playing_tick(state, phase, input, now, config, store),
        Mode::GameOver { phase, final_score, new_high_score } => {
            game_over_tick(state, phase, final_score, new_high_score, now, config)
        }
    }

    TickResult {
        frame: compose(state, now, config),
        events: state.take_events(),
        mode_changed: state.mode.kind() != mode_before,
    }
}

// =============================================================================
// ATTRACT
// =============================================================================

fn attract_tick(state: &mut EngineState, input: InputEvent, now: Millis, config: &EngineConfig) {
    match input.pressed() {
        Some(Button::One) => select_variant(state, state.variant.previous(), now),
        Some(Button::Three) => select_variant(state, state.variant.next(), now),
        Some(Button::Two) => start_game(state, now, config),
        None => {}
    }
}

fn select_variant(state: &mut EngineState, variant: GameVariant, now: Millis) {
    state.variant = variant;
    // Restart the label/high-score cycle so the new label shows first.
    state.mode_entered_at = now;
    state.push_event(GameEvent::new(now, GameEventData::VariantSelected { variant }));
    debug!("selected {}", variant.label());
}

fn start_game(state: &mut EngineState, now: Millis, config: &EngineConfig) {
    info!(
        "starting {} (high score {})",
        state.variant.label(),
        state.high_scores.get(state.variant)
    );
    state.session.begin(state.variant, config);
    start_round(state, now, config);
}

// =============================================================================
// PLAYING
// =============================================================================

fn playing_tick<S: ScoreStore + ?Sized>(
    state: &mut EngineState,
    phase: PlayPhase,
    input: InputEvent,
    now: Millis,
    config: &EngineConfig,
    store: &mut S,
) {
    match phase {
        PlayPhase::Presenting { step, timer } => {
            if !phase_over(&timer, now) {
                return;
            }
            let len = state.round().map_or(0, |round| round.rule.kind.press_count());
            let next = step + 1;
            if next < len {
                state.mode = Mode::Playing(PlayPhase::Presenting {
                    step: next,
                    timer: Timer::armed(now, playback_step_ms(config)),
                });
            } else {
                open_round(state, now);
            }
        }
        PlayPhase::Awaiting => awaiting_tick(state, input, now, config, store),
        PlayPhase::Interlude { timer } => {
            if phase_over(&timer, now) {
                start_round(state, now, config);
            }
        }
    }
}

fn awaiting_tick<S: ScoreStore + ?Sized>(
    state: &mut EngineState,
    input: InputEvent,
    now: Millis,
    config: &EngineConfig,
    store: &mut S,
) {
    let Some(round) = state.round.as_mut() else {
        warn!("no live round while awaiting input, returning to attract");
        set_mode(state, Mode::Attract, now);
        return;
    };

    match evaluate(now, &round.rule, &mut round.progress, input) {
        Verdict::Pending => {}
        Verdict::Success => round_won(state, now, config),
        Verdict::Failure(reason) => enter_game_over(state, reason, now, config, store),
    }
}

/// Generate the next rule and put it live (or into playback for memory).
fn start_round(state: &mut EngineState, now: Millis, config: &EngineConfig) {
    let bucket_before = state.session.tricks.last_bucket();
    let len_before = state.session.memory.len();

    let rule = generate(state.variant, &mut state.session, &mut state.rng, config);

    if state.variant == GameVariant::EscalatingTrick {
        match state.session.tricks.last_bucket() {
            Some(bucket) if Some(bucket) != bucket_before => {
                let stage = state.session.tricks.stage();
                debug!("trick bucket {} -> {:?}", bucket, stage);
                state.push_event(GameEvent::new(
                    now,
                    GameEventData::TrickStageChanged { stage, bucket },
                ));
            }
            _ => {}
        }
    }

    let len_after = state.session.memory.len();
    if len_after > len_before {
        state.push_event(GameEvent::new(now, GameEventData::SequenceExtended { len: len_after }));
    }

    debug!(
        "round {} window {}ms cue {:?}",
        rule.kind.label(),
        rule.window_ms,
        rule.cue.text
    );
    state.push_event(GameEvent::new(
        now,
        GameEventData::RoundStarted {
            variant: state.variant,
            kind: rule.kind.label().to_string(),
            window_ms: rule.window_ms,
        },
    ));

    let phase = match rule.kind {
        RoundKind::MemoryReplay { .. } => PlayPhase::Presenting {
            step: 0,
            timer: Timer::armed(now, playback_step_ms(config)),
        },
        _ => PlayPhase::Awaiting,
    };
    state.round = Some(ActiveRound::new(rule, now));
    set_mode(state, Mode::Playing(phase), now);
}

/// Playback finished: the first step's budget starts now.
fn open_round(state: &mut EngineState, now: Millis) {
    if let Some(round) = state.round.as_mut() {
        round.progress = RoundProgress::started(now);
        round.started_at = now;
    }
    state.mode = Mode::Playing(PlayPhase::Awaiting);
}

fn round_won(state: &mut EngineState, now: Millis, config: &EngineConfig) {
    let score = state.session.add_point();
    if state.variant.shrinks_window() {
        state.session.difficulty.on_success();
    }
    let next_window_ms = state.session.difficulty.window_ms();

    debug!("round won, score {} next window {}ms", score, next_window_ms);
    state.push_event(GameEvent::new(now, GameEventData::RoundWon { score, next_window_ms }));

    state.round = None;
    state.mode = Mode::Playing(PlayPhase::Interlude {
        timer: Timer::armed(now, config.interlude_ms),
    });
}

// =============================================================================
// GAME OVER
// =============================================================================

fn enter_game_over<S: ScoreStore + ?Sized>(
    state: &mut EngineState,
    reason: FailureReason,
    now: Millis,
    config: &EngineConfig,
    store: &mut S,
) {
    let final_score = state.session.score;
    info!(
        "{} over: {:?}, score {}",
        state.variant.label(),
        reason,
        final_score
    );
    state.push_event(GameEvent::round_lost(now, reason, final_score));
    state.round = None;

    let new_high_score = state.high_scores.record(state.variant, final_score, store);
    if new_high_score {
        state.push_event(GameEvent::new(
            now,
            GameEventData::HighScoreRecorded {
                variant: state.variant,
                score: final_score,
            },
        ));
    }

    set_mode(
        state,
        Mode::GameOver {
            phase: GameOverPhase::ShowScore {
                timer: Timer::armed(now, config.gameover_score_ms),
            },
            final_score,
            new_high_score,
        },
        now,
    );
}

fn game_over_tick(
    state: &mut EngineState,
    phase: GameOverPhase,
    final_score: u16,
    new_high_score: bool,
    now: Millis,
    config: &EngineConfig,
) {
    match phase {
        GameOverPhase::ShowScore { timer } => {
            if phase_over(&timer, now) {
                state.mode = Mode::GameOver {
                    phase: GameOverPhase::ShowHighScore {
                        timer: Timer::armed(now, config.gameover_high_ms),
                    },
                    final_score,
                    new_high_score,
                };
            }
        }
        GameOverPhase::ShowHighScore { timer } => {
            if phase_over(&timer, now) {
                set_mode(state, Mode::Attract, now);
            }
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn set_mode(state: &mut EngineState, mode: Mode, now: Millis) {
    let from = state.mode.kind();
    let to = mode.kind();
    state.mode = mode;

    if from != to {
        state.mode_entered_at = now;
        debug!("mode {:?} -> {:?}", from, to);
        state.push_event(GameEvent::mode_changed(now, from, to));
    }
}

/// A display sub-phase is over once its timer runs out. A zero-length
/// sub-phase lasts exactly one tick.
#[inline]
fn phase_over(timer: &Timer, now: Millis) -> bool {
    timer.is_untimed() || timer.expired(now)
}

#[inline]
fn playback_step_ms(config: &EngineConfig) -> Millis {
    config.memory_show_ms.saturating_add(config.memory_gap_ms)
}

// =============================================================================
// REPLAY
// =============================================================================

/// Replay a recorded input stream against an engine.
///
/// Returns the final state and every event generated along the way.
pub fn replay_session<S: ScoreStore + ?Sized>(
    initial_state: EngineState,
    recording: &InputRecording,
    config: &EngineConfig,
    store: &mut S,
) -> (EngineState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    for (_, now, input) in recording.replay_iter() {
        let result = tick(&mut state, input, now, config, store);
        all_events.extend(result.events);
    }

    (state, all_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::storage::MemoryStore;
    use crate::game::config::VariantTuning;
    use crate::game::state::ModeKind;
    use proptest::prelude::*;

    const TICK_MS: Millis = 10;

    /// Engine plus store plus a recording of everything fed in.
    struct Rig {
        state: EngineState,
        config: EngineConfig,
        store: MemoryStore,
        recording: InputRecording,
        tick_index: u32,
    }

    impl Rig {
        fn new(seed: u64) -> Self {
            Self::with_config(seed, EngineConfig::default())
        }

        fn with_config(seed: u64, config: EngineConfig) -> Self {
            Self {
                state: EngineState::new(seed, &config),
                config,
                store: MemoryStore::new(GameVariant::COUNT),
                recording: InputRecording::new(seed, 0, TICK_MS),
                tick_index: 0,
            }
        }

        fn now(&self) -> Millis {
            self.recording.time_of(self.tick_index)
        }

        fn step(&mut self, input: InputEvent) -> TickResult {
            let now = self.now();
            self.recording.record(self.tick_index, input);
            self.tick_index += 1;
            tick(&mut self.state, input, now, &self.config, &mut self.store)
        }

        fn press(&mut self, button: Button) -> TickResult {
            self.step(InputEvent::Pressed(button))
        }

        fn idle_until(&mut self, done: impl Fn(&EngineState) -> bool) {
            for _ in 0..100_000 {
                if done(&self.state) {
                    return;
                }
                self.step(InputEvent::None);
            }
            panic!("engine never reached the expected state: {:?}", self.state.mode);
        }

        fn start(&mut self, variant: GameVariant) -> TickResult {
            while self.state.variant != variant {
                self.press(Button::Three);
            }
            self.press(Button::Two)
        }

        fn await_round(&mut self) {
            self.idle_until(|s| s.mode == Mode::Playing(PlayPhase::Awaiting));
        }

        fn win_round(&mut self) {
            self.await_round();
            let solution = self
                .state
                .round()
                .map(|round| round.rule.kind.solution())
                .unwrap_or_default();
            for button in solution {
                self.press(button);
            }
            assert!(matches!(
                self.state.mode,
                Mode::Playing(PlayPhase::Interlude { .. })
            ));
        }

        fn finish(mut self) -> (EngineState, InputRecording) {
            self.recording.finalize(self.tick_index.saturating_sub(1));
            (self.state, self.recording)
        }
    }

    fn has_event(events: &[GameEvent], wanted: impl Fn(&GameEventData) -> bool) -> bool {
        events.iter().any(|event| wanted(&event.data))
    }

    #[test]
    fn test_attract_selection_wraps() {
        let mut rig = Rig::new(1);

        let result = rig.press(Button::One);
        assert_eq!(rig.state.variant, GameVariant::EscalatingTrick);
        assert_eq!(rig.state.mode, Mode::Attract);
        assert_eq!(result.frame.text, "TRIK");
        assert!(has_event(&result.events, |d| matches!(
            d,
            GameEventData::VariantSelected { variant: GameVariant::EscalatingTrick }
        )));

        rig.press(Button::Three);
        assert_eq!(rig.state.variant, GameVariant::ClassicReflex);
        assert!(rig.state.round().is_none());
    }

    #[test]
    fn test_start_generates_first_round_same_tick() {
        let mut rig = Rig::new(2);
        let result = rig.start(GameVariant::ClassicReflex);

        assert_eq!(rig.state.mode, Mode::Playing(PlayPhase::Awaiting));
        assert!(result.mode_changed);
        assert!(has_event(&result.events, |d| matches!(
            d,
            GameEventData::ModeChanged { from: ModeKind::Attract, to: ModeKind::Playing }
        )));
        assert!(has_event(&result.events, |d| matches!(d, GameEventData::RoundStarted { .. })));

        let round = rig.state.round().unwrap();
        assert_eq!(round.rule.window_ms, 1800);
        assert_eq!(result.frame.text, round.rule.cue.text);
    }

    #[test]
    fn test_success_shrinks_window_and_continues() {
        let mut rig = Rig::new(3);
        rig.start(GameVariant::ClassicReflex);

        rig.win_round();
        assert_eq!(rig.state.session.score, 1);
        assert_eq!(rig.state.session.difficulty.window_ms(), 1780);
        assert!(rig.state.round().is_none());

        rig.await_round();
        assert_eq!(rig.state.round().unwrap().rule.window_ms, 1780);
    }

    #[test]
    fn test_timeout_ends_session() {
        let mut rig = Rig::new(4);
        rig.start(GameVariant::HardReflex);

        let mut lost = Vec::new();
        while rig.state.is_playing() {
            lost.extend(rig.step(InputEvent::None).events);
        }

        assert!(has_event(&lost, |d| matches!(
            d,
            GameEventData::RoundLost { reason: FailureReason::Timeout, score: 0 }
        )));
        assert!(matches!(
            rig.state.mode,
            Mode::GameOver { final_score: 0, new_high_score: false, .. }
        ));
        assert!(rig.state.round().is_none());
    }

    #[test]
    fn test_full_mode_cycle() {
        let mut rig = Rig::new(5);
        rig.start(GameVariant::ForbiddenPress);
        rig.win_round();
        rig.win_round();
        rig.await_round();

        let wrong = match rig.state.round().unwrap().rule.kind {
            RoundKind::ForbiddenPress { forbidden, .. } => forbidden[0],
            ref other => panic!("unexpected round {:?}", other),
        };
        let result = rig.press(wrong);
        assert!(has_event(&result.events, |d| matches!(
            d,
            GameEventData::RoundLost { reason: FailureReason::ForbiddenButton, score: 2 }
        )));
        assert_eq!(result.frame, Frame::new("   2", 4));

        rig.idle_until(|s| {
            matches!(
                s.mode,
                Mode::GameOver { phase: GameOverPhase::ShowHighScore { .. }, .. }
            )
        });
        rig.idle_until(|s| s.mode == Mode::Attract);

        assert_eq!(rig.state.variant, GameVariant::ForbiddenPress);
        assert_eq!(rig.state.high_scores.get(GameVariant::ForbiddenPress), 2);
        assert_eq!(rig.store.load(GameVariant::ForbiddenPress.index()).unwrap(), 2);
    }

    #[test]
    fn test_high_score_written_once() {
        let mut rig = Rig::new(6);
        rig.start(GameVariant::ClassicReflex);
        rig.win_round();
        rig.idle_until(|s| s.mode == Mode::Attract);
        assert_eq!(rig.store.writes(), 1);

        // A worse second game leaves storage alone.
        rig.start(GameVariant::ClassicReflex);
        rig.idle_until(|s| s.mode == Mode::Attract);
        assert_eq!(rig.store.writes(), 1);
        assert_eq!(rig.state.high_scores.get(GameVariant::ClassicReflex), 1);
    }

    #[test]
    fn test_storage_failure_keeps_playing() {
        let mut rig = Rig::new(7);
        rig.store.set_fail_writes(true);
        rig.start(GameVariant::ClassicReflex);
        rig.win_round();
        rig.idle_until(|s| s.mode == Mode::Attract);

        assert_eq!(rig.state.high_scores.get(GameVariant::ClassicReflex), 1);
        assert_eq!(rig.store.writes(), 0);

        rig.start(GameVariant::ClassicReflex);
        assert!(rig.state.is_playing());
    }

    #[test]
    fn test_memory_session_scenario() {
        let mut rig = Rig::new(8);
        let result = rig.start(GameVariant::ChordedMemory);
        assert!(matches!(
            rig.state.mode,
            Mode::Playing(PlayPhase::Presenting { step: 0, .. })
        ));
        assert!(has_event(&result.events, |d| matches!(
            d,
            GameEventData::SequenceExtended { len: 1 }
        )));

        for _ in 0..3 {
            rig.win_round();
        }
        assert_eq!(rig.state.session.score, 3);
        assert_eq!(rig.state.session.difficulty.window_ms(), rig.config.memory_step_ms);

        rig.await_round();
        assert_eq!(rig.state.session.memory.len(), 4);
        let steps = rig.state.round().unwrap().rule.kind.solution();
        assert_eq!(steps.len(), 4);

        rig.press(steps[0]);
        rig.press(steps[1]);
        let wrong = Button::ALL
            .into_iter()
            .find(|button| *button != steps[2])
            .unwrap();
        let result = rig.press(wrong);

        assert!(has_event(&result.events, |d| matches!(
            d,
            GameEventData::RoundLost { reason: FailureReason::WrongButton, score: 3 }
        )));
        assert!(matches!(rig.state.mode, Mode::GameOver { final_score: 3, .. }));
    }

    #[test]
    fn test_memory_playback_ignores_input() {
        let mut rig = Rig::new(9);
        rig.start(GameVariant::ChordedMemory);

        let shown = rig.state.round().unwrap().rule.kind.solution()[0];
        let frame = rig.step(InputEvent::None).frame;
        assert_eq!(frame.text.chars().nth(shown.index()), Some(shown.digit()));

        // Wrong presses during playback do nothing.
        let wrong = shown.opposite();
        if wrong != shown {
            rig.press(wrong);
        }
        assert!(matches!(
            rig.state.mode,
            Mode::Playing(PlayPhase::Presenting { .. })
        ));
    }

    #[test]
    fn test_zero_window_round_is_untimed() {
        let config = EngineConfig {
            classic: VariantTuning::new(0, 0, 0),
            ..EngineConfig::default()
        };
        let mut state = EngineState::new(10, &config);
        let mut store = MemoryStore::new(GameVariant::COUNT);

        tick(&mut state, InputEvent::Pressed(Button::Two), 0, &config, &mut store);
        assert_eq!(state.round().unwrap().rule.window_ms, 0);

        for now in [1_000, 1_000_000, u32::MAX] {
            tick(&mut state, InputEvent::None, now, &config, &mut store);
            assert_eq!(state.mode, Mode::Playing(PlayPhase::Awaiting));
        }
    }

    #[test]
    fn test_trick_stage_events_per_bucket() {
        let mut rig = Rig::new(11);
        let result = rig.start(GameVariant::EscalatingTrick);
        assert!(has_event(&result.events, |d| matches!(
            d,
            GameEventData::TrickStageChanged { stage: crate::game::trick::TrickStage::Plain, bucket: 0 }
        )));

        let mut events = Vec::new();
        for _ in 0..5 {
            rig.win_round();
        }
        while !matches!(rig.state.mode, Mode::Playing(PlayPhase::Awaiting)) {
            events.extend(rig.step(InputEvent::None).events);
        }
        assert!(has_event(&events, |d| matches!(
            d,
            GameEventData::TrickStageChanged { bucket: 1, .. }
        )));
        assert_eq!(rig.state.session.tricks.last_bucket(), Some(1));
    }

    #[test]
    fn test_replay_determinism() {
        let mut rig = Rig::new(99_999);
        for variant in [GameVariant::HardReflex, GameVariant::ChordedMemory, GameVariant::EscalatingTrick] {
            rig.start(variant);
            for _ in 0..4 {
                rig.win_round();
            }
            rig.idle_until(|s| s.mode == Mode::Attract);
        }
        let (live, recording) = rig.finish();

        let config = EngineConfig::default();
        let replay = |seed| {
            let mut store = MemoryStore::new(GameVariant::COUNT);
            replay_session(EngineState::new(seed, &config), &recording, &config, &mut store)
        };
        let (final1, events1) = replay(recording.rng_seed);
        let (final2, events2) = replay(recording.rng_seed);

        assert_eq!(final1.compute_hash(), final2.compute_hash());
        assert_eq!(final1.compute_hash(), live.compute_hash());
        assert_eq!(events1, events2);
        assert_eq!(final1.high_scores.get(GameVariant::ChordedMemory), 4);
    }

    proptest! {
        #[test]
        fn prop_round_only_while_playing(seed in any::<u64>(), raw in prop::collection::vec(0u8..6, 0..400)) {
            let config = EngineConfig::default();
            let mut state = EngineState::new(seed, &config);
            let mut store = MemoryStore::new(GameVariant::COUNT);

            for (i, raw) in raw.into_iter().enumerate() {
                let now = (i as u32).wrapping_mul(97);
                let result = tick(&mut state, InputEvent::from_raw(raw), now, &config, &mut store);
                prop_assert!(state.round().is_none() || state.is_playing());
                prop_assert!(result.frame.indicators <= crate::INDICATOR_COUNT);
            }
        }
    }
}
