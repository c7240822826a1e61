//! Memory Sequence
//!
//! Append-only list of buttons for the memory game. Starts with one element,
//! gains one per fully-correct replay, and stops growing at its cap.

use serde::{Serialize, Deserialize};

use crate::core::rng::RandomSource;
use crate::game::config::MEMORY_HARD_CAP;
use crate::game::input::Button;

/// Growing sequence the player has to replay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySequence {
    steps: Vec<Button>,
    max_len: usize,
}

impl MemorySequence {
    /// Empty sequence with a length cap, clamped to `1..=MEMORY_HARD_CAP`.
    pub fn new(max_len: usize) -> Self {
        let max_len = max_len.clamp(1, MEMORY_HARD_CAP);
        Self {
            steps: Vec::with_capacity(max_len),
            max_len,
        }
    }

    /// Append one random element unless already at the cap.
    ///
    /// Returns whether the sequence grew.
    pub fn extend<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_full() {
            return false;
        }
        self.steps.push(Button::random(rng));
        true
    }

    /// Current elements in order.
    pub fn steps(&self) -> &[Button] {
        &self.steps
    }

    /// Current length.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if no element has been drawn yet.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Configured cap.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Check if the cap has been reached.
    pub fn is_full(&self) -> bool {
        self.steps.len() >= self.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;

    #[test]
    fn test_growth_is_append_only() {
        let mut rng = DeterministicRng::new(3);
        let mut sequence = MemorySequence::new(8);

        assert!(sequence.extend(&mut rng));
        let prefix = sequence.steps().to_vec();

        for expected_len in 2..=5 {
            assert!(sequence.extend(&mut rng));
            assert_eq!(sequence.len(), expected_len);
            assert_eq!(&sequence.steps()[..prefix.len()], prefix.as_slice());
        }
    }

    #[test]
    fn test_stops_at_cap() {
        let mut rng = DeterministicRng::new(4);
        let mut sequence = MemorySequence::new(3);

        for _ in 0..10 {
            sequence.extend(&mut rng);
        }

        assert_eq!(sequence.len(), 3);
        assert!(sequence.is_full());
        assert!(!sequence.extend(&mut rng));
    }

    #[test]
    fn test_zero_cap_still_holds_one() {
        let mut rng = DeterministicRng::new(5);
        let mut sequence = MemorySequence::new(0);
        assert_eq!(sequence.max_len(), 1);

        assert!(sequence.extend(&mut rng));
        assert!(!sequence.extend(&mut rng));
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn test_oversized_cap_is_clamped() {
        let mut rng = DeterministicRng::new(6);
        let mut sequence = MemorySequence::new(usize::MAX);
        assert_eq!(sequence.max_len(), MEMORY_HARD_CAP);

        for _ in 0..MEMORY_HARD_CAP + 10 {
            sequence.extend(&mut rng);
        }
        assert_eq!(sequence.len(), MEMORY_HARD_CAP);
    }
}
