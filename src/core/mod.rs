//! Core deterministic primitives.
//!
//! Clock arithmetic, the seeded random source and state hashing. Nothing in
//! here knows about buttons or games.

pub mod timer;
pub mod rng;
pub mod hash;

// Re-export core types
pub use timer::{Millis, Timer};
pub use rng::{DeterministicRng, RandomSource};
pub use hash::{StateHash, StateHasher, compute_state_hash};
