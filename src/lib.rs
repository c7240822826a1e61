//! # Reflex Arcade
//!
//! Game engine for a small reflex and memory console: three buttons, four
//! indicator lights and a four-character display.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       REFLEX ARCADE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── timer.rs    - Wraparound-safe millisecond timers        │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Button events and recordings              │
//! │  ├── rule.rs     - Round rules and generator                 │
//! │  ├── trick.rs    - Weighted trick stages                     │
//! │  ├── evaluate.rs - Round evaluator                           │
//! │  ├── state.rs    - Engine context and modes                  │
//! │  ├── tick.rs     - Mode state machine                        │
//! │  └── frame.rs    - Display composition                       │
//! │                                                              │
//! │  console/        - Hardware collaborators                    │
//! │  ├── display.rs  - Segment display + indicators              │
//! │  ├── storage.rs  - High-score slots                          │
//! │  └── driver.rs   - Polling driver                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - All randomness from a seeded Xorshift128+
//! - Time only enters as the `now` argument of each tick
//! - Deadlines are re-derived with wrapping arithmetic every tick
//!
//! Given identical inputs, clock readings and seed, a session produces
//! identical rounds, scores and state hashes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod console;

// Re-export commonly used types
pub use crate::core::rng::{DeterministicRng, RandomSource};
pub use crate::core::timer::{Millis, Timer};
pub use game::input::{Button, InputEvent, InputRecording};
pub use game::state::EngineState;
pub use game::tick::{tick, TickResult};
pub use game::variant::GameVariant;
pub use game::config::EngineConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Characters on the display.
pub const DISPLAY_WIDTH: usize = 4;

/// Indicator lights on the panel.
pub const INDICATOR_COUNT: u8 = 4;

/// Poll period of the reference console (ms).
pub const POLL_PERIOD_MS: u32 = 10;
