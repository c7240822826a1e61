//! Reflex Arcade Demo
//!
//! Boots a console in memory, lets a bot play every game variant, then
//! replays the captured input stream and checks the state hashes match.
//!
//! Usage: `reflex-arcade [config.json]`, seed from `REFLEX_SEED`.

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use reflex_arcade::{
    POLL_PERIOD_MS, VERSION,
    console::{Console, MemoryStore, RecordingDisplay},
    core::timer::elapsed_between,
    game::{
        config::EngineConfig,
        events::GameEventData,
        input::{Button, InputEvent, InputRecording},
        rule::RoundKind,
        scores::HighScoreTable,
        state::{EngineState, Mode, PlayPhase},
        tick::replay_session,
        variant::GameVariant,
    },
};

/// Bot reaction time per press.
const REACTION_MS: u32 = 150;

/// Score the bot stops at for each variant, in selector order.
const TARGET_SCORES: [u16; GameVariant::COUNT] = [12, 8, 10, 6, 15];

const DEFAULT_SEED: u64 = 12345;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Reflex Arcade v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => EngineConfig::default(),
    };
    let seed = match std::env::var("REFLEX_SEED") {
        Ok(value) => value
            .parse::<u64>()
            .with_context(|| format!("REFLEX_SEED is not a number: {}", value))?,
        Err(_) => DEFAULT_SEED,
    };

    demo_session(config, seed)
}

/// Console plus the recording of everything fed into it.
struct Demo {
    console: Console<RecordingDisplay, MemoryStore>,
    recording: InputRecording,
    tick: u32,
}

impl Demo {
    fn step(&mut self, raw: u8) {
        let now = self.recording.time_of(self.tick);
        self.recording.record(self.tick, InputEvent::from_raw(raw));
        self.tick += 1;

        let result = self.console.poll(raw, now);
        for event in &result.events {
            match &event.data {
                GameEventData::RoundLost { reason, score } => {
                    info!("  lost at {} ms: {:?}, score {}", event.at, reason, score);
                }
                GameEventData::HighScoreRecorded { variant, score } => {
                    info!("  new high score for {}: {}", variant.label(), score);
                }
                GameEventData::TrickStageChanged { stage, bucket } => {
                    info!("  trick bucket {}: {:?}", bucket, stage);
                }
                _ => debug!("{:?}", event),
            }
        }
    }
}

/// Raw button the bot presses this tick (0 = none).
///
/// Plays correctly until the target score, then misses on purpose so the
/// session also ends when windows are untimed.
fn bot_press(state: &EngineState, target: u16) -> u8 {
    if state.mode != Mode::Playing(PlayPhase::Awaiting) {
        return 0;
    }
    let Some(round) = state.round() else {
        return 0;
    };
    if elapsed_between(round.progress.step_started_at, state.now) < REACTION_MS {
        return 0;
    }

    let next = match round.rule.kind {
        RoundKind::ChordedPair { .. } => round.progress.chord_first.is_some() as usize,
        _ => round.progress.matched,
    };
    let Some(expected) = round.rule.kind.solution().get(next).copied() else {
        return 0;
    };

    if state.session.score < target {
        return expected.id();
    }
    // A held chord partner pressed again loses; elsewhere any other button does.
    let miss = match round.progress.chord_first {
        Some(first) => Some(first),
        None => Button::ALL.into_iter().find(|button| *button != expected),
    };
    miss.map_or(0, |button| button.id())
}

/// Demo function to exercise the engine.
fn demo_session(config: EngineConfig, seed: u64) -> Result<()> {
    info!("=== Starting Demo Session ===");
    info!("RNG Seed: {}", seed);

    let console = Console::boot(
        config.clone(),
        RecordingDisplay::new(),
        MemoryStore::new(GameVariant::COUNT),
        seed,
        0,
    )
    .context("invalid engine configuration")?;
    let mut demo = Demo {
        console,
        recording: InputRecording::new(seed, 0, POLL_PERIOD_MS),
        tick: 0,
    };

    for (variant, target) in GameVariant::ALL.into_iter().zip(TARGET_SCORES) {
        while demo.console.state().variant != variant {
            demo.step(3);
        }
        info!("Playing {} (bot stops at {})", variant.label(), target);
        demo.step(2);

        while demo.console.state().mode != Mode::Attract {
            let raw = bot_press(demo.console.state(), target);
            demo.step(raw);
        }
    }
    demo.recording.finalize(demo.tick.saturating_sub(1));

    // Print final results
    info!("=== Session Results ===");
    for variant in GameVariant::ALL {
        info!("{}: {}", variant.label(), demo.console.state().high_scores.get(variant));
    }
    info!(
        "{} ticks, {} presses, {} panel updates",
        demo.tick,
        demo.recording.press_count(),
        demo.console.display().history().len()
    );

    let hash = demo.console.state().compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let bytes = demo.recording.to_bytes().context("failed to encode recording")?;
    info!("Recording: {} bytes", bytes.len());
    let recording = InputRecording::from_bytes(&bytes).context("failed to decode recording")?;

    let mut replay_store = MemoryStore::new(GameVariant::COUNT);
    let initial = EngineState::with_high_scores(
        recording.rng_seed,
        &config,
        HighScoreTable::load_all(&replay_store),
        recording.start_ms,
    );
    let (replay_final, replay_events) = replay_session(initial, &recording, &config, &mut replay_store);
    let replay_hash = replay_final.compute_hash();

    info!("Replay State Hash: {} ({} events)", hex::encode(replay_hash), replay_events.len());

    if hash != replay_hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
