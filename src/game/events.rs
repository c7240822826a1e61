//! Engine Events
//!
//! Everything notable that happens during a tick is pushed as a [`GameEvent`]
//! and handed back to the caller in the tick result. Events are only a
//! record; the engine never reads them back.

use serde::{Serialize, Deserialize};

use crate::core::timer::Millis;
use crate::game::evaluate::FailureReason;
use crate::game::state::ModeKind;
use crate::game::trick::TrickStage;
use crate::game::variant::GameVariant;

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Top-level mode changed.
    ModeChanged {
        /// Previous mode.
        from: ModeKind,
        /// New mode.
        to: ModeKind,
    },

    /// Attract selection moved.
    VariantSelected {
        /// Newly selected variant.
        variant: GameVariant,
    },

    /// A fresh round rule went live.
    RoundStarted {
        /// Variant being played.
        variant: GameVariant,
        /// Kind label ("single", "chord", ...).
        kind: String,
        /// Reaction budget.
        window_ms: Millis,
    },

    /// The round was won.
    RoundWon {
        /// Score after the win.
        score: u16,
        /// Window for the next round.
        next_window_ms: Millis,
    },

    /// The round was lost; the session is over.
    RoundLost {
        /// Why.
        reason: FailureReason,
        /// Final score.
        score: u16,
    },

    /// The escalating game entered a new score bucket.
    TrickStageChanged {
        /// Stage for the bucket.
        stage: TrickStage,
        /// Bucket index (`score / trick_step`).
        bucket: u32,
    },

    /// The memory sequence gained an element.
    SequenceExtended {
        /// New length.
        len: usize,
    },

    /// A new high score was recorded.
    HighScoreRecorded {
        /// Variant.
        variant: GameVariant,
        /// Score.
        score: u16,
    },
}

/// An event stamped with the clock reading of the tick that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Clock reading.
    pub at: Millis,
    /// Payload.
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(at: Millis, data: GameEventData) -> Self {
        Self { at, data }
    }

    /// Mode transition.
    pub fn mode_changed(at: Millis, from: ModeKind, to: ModeKind) -> Self {
        Self::new(at, GameEventData::ModeChanged { from, to })
    }

    /// Round lost.
    pub fn round_lost(at: Millis, reason: FailureReason, score: u16) -> Self {
        Self::new(at, GameEventData::RoundLost { reason, score })
    }
}
