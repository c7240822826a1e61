//! Engine Configuration
//!
//! Every timing constant the engine uses, with defaults matching the shipped
//! console firmware. Loadable from JSON; missing fields fall back to defaults.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::timer::Millis;
use crate::game::variant::GameVariant;

/// Longest memory sequence the engine will ever build.
pub const MEMORY_HARD_CAP: usize = 64;

/// Reaction-window tuning for one variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTuning {
    /// Window at the start of every game.
    pub start_ms: Millis,
    /// Shrink per success.
    pub step_ms: Millis,
    /// Window never shrinks below this.
    pub floor_ms: Millis,
}

impl VariantTuning {
    /// Create a tuning triple.
    pub const fn new(start_ms: Millis, step_ms: Millis, floor_ms: Millis) -> Self {
        Self {
            start_ms,
            step_ms,
            floor_ms,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value the engine cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// JSON could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config file could not be read.
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Classic reflex window.
    pub classic: VariantTuning,
    /// Hard reflex window.
    pub hard: VariantTuning,
    /// Forbidden-press window.
    pub forbidden: VariantTuning,
    /// Escalating-trick window.
    pub trick: VariantTuning,

    /// Points per trick bucket; the stage is re-rolled when the bucket changes.
    pub trick_step: u16,
    /// Time allowed between the two presses of a chord.
    pub chord_window_ms: Millis,
    /// How long a flashed cue stays visible.
    pub flash_ms: Millis,
    /// Half-period of a blinking cue.
    pub blink_period_ms: Millis,

    /// Memory sequence cap.
    pub memory_max_len: usize,
    /// Per-step budget while replaying a memory sequence.
    pub memory_step_ms: Millis,
    /// How long each element is shown during playback.
    pub memory_show_ms: Millis,
    /// Blank gap after each shown element.
    pub memory_gap_ms: Millis,

    /// Pause after a success before the next round.
    pub interlude_ms: Millis,
    /// Attract mode alternates label and high score with this period.
    pub attract_cycle_ms: Millis,
    /// Game over: how long the final score blinks.
    pub gameover_score_ms: Millis,
    /// Game over: blink half-period of the final score.
    pub gameover_blink_period_ms: Millis,
    /// Game over: how long the high score is shown afterwards.
    pub gameover_high_ms: Millis,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            classic: VariantTuning::new(1800, 20, 360),
            hard: VariantTuning::new(1200, 20, 300),
            forbidden: VariantTuning::new(2000, 25, 500),
            trick: VariantTuning::new(1600, 15, 400),
            trick_step: 5,
            chord_window_ms: 300,
            flash_ms: 150,
            blink_period_ms: 120,
            memory_max_len: 32,
            memory_step_ms: 1500,
            memory_show_ms: 450,
            memory_gap_ms: 150,
            interlude_ms: 400,
            attract_cycle_ms: 1500,
            gameover_score_ms: 3000,
            gameover_blink_period_ms: 250,
            gameover_high_ms: 2000,
        }
    }
}

impl EngineConfig {
    /// Window tuning for a variant.
    ///
    /// The memory game has no shrinking window; its per-step budget is
    /// reported as a constant tuning.
    pub fn tuning(&self, variant: GameVariant) -> VariantTuning {
        match variant {
            GameVariant::ClassicReflex => self.classic,
            GameVariant::HardReflex => self.hard,
            GameVariant::ForbiddenPress => self.forbidden,
            GameVariant::ChordedMemory => {
                VariantTuning::new(self.memory_step_ms, 0, self.memory_step_ms)
            }
            GameVariant::EscalatingTrick => self.trick,
        }
    }

    /// Parse from JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values the engine cannot run with.
    ///
    /// Zero windows are allowed everywhere: they mean "untimed".
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("classic", self.classic),
            ("hard", self.hard),
            ("forbidden", self.forbidden),
            ("trick", self.trick),
        ];
        for (field, tuning) in windows {
            if tuning.floor_ms > tuning.start_ms {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!(
                        "floor {} ms is above start {} ms",
                        tuning.floor_ms, tuning.start_ms
                    ),
                });
            }
        }

        if self.trick_step == 0 {
            return Err(ConfigError::Invalid {
                field: "trick_step",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.memory_max_len == 0 || self.memory_max_len > MEMORY_HARD_CAP {
            return Err(ConfigError::Invalid {
                field: "memory_max_len",
                reason: format!("must be within 1..={}", MEMORY_HARD_CAP),
            });
        }

        if self.memory_show_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "memory_show_ms",
                reason: "playback elements must be visible".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.classic, VariantTuning::new(1800, 20, 360));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "trick_step": 3, "flash_ms": 90 }"#).unwrap();

        assert_eq!(config.trick_step, 3);
        assert_eq!(config.flash_ms, 90);
        assert_eq!(config.memory_max_len, EngineConfig::default().memory_max_len);
    }

    #[test]
    fn test_rejects_floor_above_start() {
        let json = r#"{ "hard": { "start_ms": 300, "step_ms": 10, "floor_ms": 400 } }"#;
        let err = EngineConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "hard", .. }));
    }

    #[test]
    fn test_rejects_bad_memory_cap_and_step() {
        let mut config = EngineConfig::default();
        config.memory_max_len = MEMORY_HARD_CAP + 1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.trick_step = 0;
        assert!(config.validate().is_err());

        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_memory_tuning_is_constant() {
        let config = EngineConfig::default();
        let tuning = config.tuning(GameVariant::ChordedMemory);
        assert_eq!(tuning.start_ms, config.memory_step_ms);
        assert_eq!(tuning.step_ms, 0);
    }
}
