//! Game Logic Module
//!
//! Everything between the button poll and the display frame. Deterministic
//! for a given seed, config and input stream.
//!
//! ## Module Structure
//!
//! - `input`: Button events and input recordings
//! - `variant`: The five selectable games
//! - `config`: Timing constants and per-variant tuning
//! - `rule`: Round rules and the per-round generator
//! - `memory`: Growing sequence for the memory game
//! - `trick`: Weighted trick stages for the escalating game
//! - `evaluate`: Judges input against the live rule
//! - `difficulty`: Shrinking reaction window
//! - `scores`: High-score cache mirrored to storage
//! - `state`: Engine context, modes and session
//! - `tick`: Mode state machine and replay
//! - `frame`: What the display shows
//! - `events`: Engine events for logging and replay

pub mod input;
pub mod variant;
pub mod config;
pub mod rule;
pub mod memory;
pub mod trick;
pub mod evaluate;
pub mod difficulty;
pub mod scores;
pub mod state;
pub mod tick;
pub mod frame;
pub mod events;

// Re-export key types
pub use input::{Button, InputEvent, InputRecording};
pub use variant::GameVariant;
pub use config::{EngineConfig, VariantTuning, ConfigError};
pub use rule::{RoundKind, RoundRule};
pub use evaluate::{Verdict, FailureReason, RoundProgress};
pub use state::{EngineState, Mode, PlayPhase, GameOverPhase, Session};
pub use tick::{tick, replay_session, TickResult};
pub use frame::Frame;
pub use events::{GameEvent, GameEventData};
