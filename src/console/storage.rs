//! Score Storage
//!
//! Non-volatile storage for one small value per game variant. On the
//! console this is a handful of EEPROM words; an erased word reads back as
//! all ones, which the high-score table treats as "never written".

use thiserror::Error;

/// Raw value of a slot that has never been written.
pub const UNSET_SLOT: u16 = 0xFFFF;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Slot index outside the device's range.
    #[error("storage slot {0} out of range")]
    SlotOutOfRange(u8),

    /// The device rejected a read.
    #[error("read of slot {slot} failed: {reason}")]
    ReadFailed {
        /// Slot index.
        slot: u8,
        /// Device-specific reason.
        reason: String,
    },

    /// The device rejected a write.
    #[error("write of slot {slot} failed: {reason}")]
    WriteFailed {
        /// Slot index.
        slot: u8,
        /// Device-specific reason.
        reason: String,
    },
}

/// Persistent score slots, keyed by variant index.
pub trait ScoreStore {
    /// Read a slot. Never-written slots return [`UNSET_SLOT`].
    fn load(&self, slot: u8) -> Result<u16, StorageError>;

    /// Write a slot.
    fn store(&mut self, slot: u8, value: u16) -> Result<(), StorageError>;
}

/// RAM-backed store, used by the demo binary and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryStore {
    slots: Vec<u16>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    /// Store with `slot_count` erased slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![UNSET_SLOT; slot_count],
            writes: 0,
            fail_writes: false,
        }
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Make every subsequent write fail (simulates a worn-out device).
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self, slot: u8) -> Result<u16, StorageError> {
        self.slots
            .get(slot as usize)
            .copied()
            .ok_or(StorageError::SlotOutOfRange(slot))
    }

    fn store(&mut self, slot: u8, value: u16) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed {
                slot,
                reason: "device write-protected".to_string(),
            });
        }
        let cell = self
            .slots
            .get_mut(slot as usize)
            .ok_or(StorageError::SlotOutOfRange(slot))?;
        *cell = value;
        self.writes += 1;
        Ok(())
    }
}
