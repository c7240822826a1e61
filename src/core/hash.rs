//! Engine State Hashing
//!
//! SHA-256 digests of the engine context, used to check that replaying a
//! recorded input stream lands in exactly the same state.

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Domain separator for engine snapshots.
const ENGINE_STATE_DOMAIN: &[u8] = b"REFLEX_ARCADE_STATE_V1";

/// Incremental hasher with fixed-width little-endian helpers.
///
/// Order of updates is part of the digest.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Hasher for engine snapshots.
    pub fn for_engine_state() -> Self {
        Self::new(ENGINE_STATE_DOMAIN)
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u16 value (little-endian).
    #[inline]
    pub fn update_u16(&mut self, value: u16) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Length-prefixed byte string, so adjacent fields cannot alias.
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.update_bytes(value.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute an engine snapshot hash.
///
/// Seed and clock are always hashed first; the closure appends the rest.
pub fn compute_state_hash<F>(now: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_engine_state();
    hasher.update_u32(now);
    hasher.update_u64(rng_seed);
    add_state(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_engine_state();
            hasher.update_u16(360);
            hasher.update_u64(12345);
            hasher.update_str("MEMO");
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_str_fields_do_not_alias() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_str("AB");
            h.update_str("C");
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_str("A");
            h.update_str("BC");
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(100, 12345, |hasher| hasher.update_u16(7));
        let hash2 = compute_state_hash(100, 12345, |hasher| hasher.update_u16(7));
        assert_eq!(hash, hash2);

        let hash3 = compute_state_hash(101, 12345, |hasher| hasher.update_u16(7));
        assert_ne!(hash, hash3);
    }
}
