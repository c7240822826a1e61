//! High Score Table
//!
//! One best score per variant, cached in RAM and mirrored to the score store.
//! The cache is authoritative while powered: a failed write is logged and the
//! cached value is kept, it is never retried.

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::console::storage::{ScoreStore, StorageError, UNSET_SLOT};
use crate::game::variant::GameVariant;

/// Map a raw slot value to a score. Erased slots count as zero.
#[inline]
pub fn decode_slot(raw: u16) -> u16 {
    if raw == UNSET_SLOT {
        0
    } else {
        raw
    }
}

/// Cached high scores.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreTable {
    scores: [u16; GameVariant::COUNT],
}

impl HighScoreTable {
    /// All zeros, nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every slot. Unreadable slots are logged and start at zero.
    pub fn load_all<S: ScoreStore + ?Sized>(store: &S) -> Self {
        let mut table = Self::new();
        for variant in GameVariant::ALL {
            table.scores[variant.index() as usize] = match store.load(variant.index()) {
                Ok(raw) => decode_slot(raw),
                Err(err) => {
                    warn!("high score for {} unreadable: {}", variant.label(), err);
                    0
                }
            };
        }
        table
    }

    /// Cached score for a variant.
    #[inline]
    pub fn get(&self, variant: GameVariant) -> u16 {
        self.scores[variant.index() as usize]
    }

    /// Record a finished session. Writes only when `score` beats the cache.
    ///
    /// Returns whether this is a new high score. Calling it twice with the
    /// same score is a no-op the second time.
    pub fn record<S: ScoreStore + ?Sized>(
        &mut self,
        variant: GameVariant,
        score: u16,
        store: &mut S,
    ) -> bool {
        let slot = variant.index() as usize;
        if score <= self.scores[slot] {
            return false;
        }

        self.scores[slot] = score;
        match store.store(variant.index(), score) {
            Ok(()) => debug!("high score {} for {} saved", score, variant.label()),
            Err(err) => warn!(
                "high score {} for {} not persisted: {}",
                score,
                variant.label(),
                err
            ),
        }
        true
    }

    /// Wipe every slot back to the erased value and zero the cache.
    ///
    /// Stops at the first storage error; slots already wiped stay wiped.
    pub fn clear_all<S: ScoreStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        for variant in GameVariant::ALL {
            store.store(variant.index(), UNSET_SLOT)?;
            self.scores[variant.index() as usize] = 0;
        }
        Ok(())
    }
}
