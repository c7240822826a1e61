//! Console Driver
//!
//! Glue between the polling loop and the engine. Owns the engine context,
//! the configuration and both collaborators; each [`Console::poll`] decodes
//! the raw button id, runs one tick and refreshes the panel when the frame
//! changed.

use tracing::info;

use crate::console::display::Display;
use crate::console::storage::{ScoreStore, StorageError};
use crate::core::timer::Millis;
use crate::game::config::{ConfigError, EngineConfig};
use crate::game::frame::Frame;
use crate::game::input::InputEvent;
use crate::game::scores::HighScoreTable;
use crate::game::state::EngineState;
use crate::game::tick::{tick, TickResult};

/// A powered-on console.
pub struct Console<D: Display, S: ScoreStore> {
    state: EngineState,
    config: EngineConfig,
    display: D,
    store: S,
    last_frame: Option<Frame>,
}

impl<D: Display, S: ScoreStore> Console<D, S> {
    /// Power on: validate the configuration, load high scores and enter
    /// attract mode at `now`.
    pub fn boot(
        config: EngineConfig,
        display: D,
        store: S,
        rng_seed: u64,
        now: Millis,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let high_scores = HighScoreTable::load_all(&store);
        let state = EngineState::with_high_scores(rng_seed, &config, high_scores, now);
        info!("console booted, seed {}", rng_seed);

        Ok(Self {
            state,
            config,
            display,
            store,
            last_frame: None,
        })
    }

    /// Run one poll with the raw button id (0 = nothing pressed).
    pub fn poll(&mut self, raw_button: u8, now: Millis) -> TickResult {
        let input = InputEvent::from_raw(raw_button);
        let result = tick(&mut self.state, input, now, &self.config, &mut self.store);

        if self.last_frame.as_ref() != Some(&result.frame) {
            self.display.render_text(&result.frame.text);
            self.display.set_indicators(result.frame.indicators);
            self.last_frame = Some(result.frame.clone());
        }
        result
    }

    /// Power-on score wipe. Only the boot routine should call this.
    pub fn wipe_scores(&mut self) -> Result<(), StorageError> {
        self.state.high_scores.clear_all(&mut self.store)
    }

    /// Engine context.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Display collaborator.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Storage collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down into the engine context and collaborators.
    pub fn into_parts(self) -> (EngineState, D, S) {
        (self.state, self.display, self.store)
    }
}
