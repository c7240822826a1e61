//! Game Variants
//!
//! The five selectable games. Each has a fixed display label and its own
//! high-score slot in persistent storage.

use serde::{Serialize, Deserialize};

/// Selectable game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum GameVariant {
    /// Press the shown digit.
    #[default]
    ClassicReflex = 0,
    /// Press the shown digit; it can appear in any of the four slots.
    HardReflex = 1,
    /// Two digits are forbidden; press the third.
    ForbiddenPress = 2,
    /// Watch a growing sequence, then replay it.
    ChordedMemory = 3,
    /// Side reflex with tricks that change every few points.
    EscalatingTrick = 4,
}

impl GameVariant {
    /// Number of variants.
    pub const COUNT: usize = 5;

    /// All variants in selector order.
    pub const ALL: [GameVariant; Self::COUNT] = [
        GameVariant::ClassicReflex,
        GameVariant::HardReflex,
        GameVariant::ForbiddenPress,
        GameVariant::ChordedMemory,
        GameVariant::EscalatingTrick,
    ];

    /// Get variant from selector index.
    pub fn from_index(index: u8) -> Option<GameVariant> {
        Self::ALL.get(index as usize).copied()
    }

    /// Selector index, also the persistent storage slot.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Four-character display label.
    pub fn label(self) -> &'static str {
        match self {
            GameVariant::ClassicReflex => "CLSC",
            GameVariant::HardReflex => "HARD",
            GameVariant::ForbiddenPress => "FRBD",
            GameVariant::ChordedMemory => "MEMO",
            GameVariant::EscalatingTrick => "TRIK",
        }
    }

    /// Next variant, wrapping from the last to the first.
    pub fn next(self) -> GameVariant {
        Self::ALL[(self as usize + 1) % Self::COUNT]
    }

    /// Previous variant, wrapping from the first to the last.
    pub fn previous(self) -> GameVariant {
        Self::ALL[(self as usize + Self::COUNT - 1) % Self::COUNT]
    }

    /// Whether successes shrink the reaction window.
    ///
    /// The memory game grows its sequence instead.
    #[inline]
    pub fn shrinks_window(self) -> bool {
        !matches!(self, GameVariant::ChordedMemory)
    }
}
