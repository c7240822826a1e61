//! Console Layer
//!
//! The hardware-facing side: display and storage collaborators behind traits,
//! and the driver that polls the engine. Nothing here makes gameplay
//! decisions; all of that runs through `game/`.

pub mod display;
pub mod storage;
pub mod driver;

pub use display::{Display, RecordingDisplay};
pub use storage::{ScoreStore, MemoryStore, StorageError, UNSET_SLOT};
pub use driver::Console;
