//! Button Input
//!
//! The debouncer hands the engine at most one fact per tick: either nothing
//! happened, or one of the three answer buttons went down. Releases and hold
//! durations are never observed.
//!
//! Sessions can be captured as an [`InputRecording`] (only ticks with a press
//! are stored) and replayed tick-for-tick.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::rng::RandomSource;
use crate::core::timer::Millis;

// =============================================================================
// BUTTONS
// =============================================================================

/// One of the three answer buttons, numbered as printed on the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Button {
    /// Left button
    One = 1,
    /// Middle button
    Two = 2,
    /// Right button
    Three = 3,
}

impl Button {
    /// All buttons in ascending order.
    pub const ALL: [Button; 3] = [Button::One, Button::Two, Button::Three];

    /// Decode a button id. Anything outside 1..=3 is not a button.
    pub const fn from_id(id: u8) -> Option<Button> {
        match id {
            1 => Some(Button::One),
            2 => Some(Button::Two),
            3 => Some(Button::Three),
            _ => None,
        }
    }

    /// Printed button number.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Zero-based index, also the display slot aligned with the button.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Digit drawn on the display for this button.
    pub const fn digit(self) -> char {
        match self {
            Button::One => '1',
            Button::Two => '2',
            Button::Three => '3',
        }
    }

    /// Mirror image across the middle button. `Two` maps to itself.
    pub const fn opposite(self) -> Button {
        match self {
            Button::One => Button::Three,
            Button::Two => Button::Two,
            Button::Three => Button::One,
        }
    }

    /// Uniformly random button.
    pub fn random<R: RandomSource + ?Sized>(rng: &mut R) -> Button {
        Button::ALL[rng.next_below(3) as usize]
    }

    /// Two distinct uniformly random buttons, in draw order.
    ///
    /// The domain is tiny, so the second draw is simply resampled until it
    /// differs from the first.
    pub fn distinct_pair<R: RandomSource + ?Sized>(rng: &mut R) -> [Button; 2] {
        let first = Button::random(rng);
        let mut second = Button::random(rng);
        while second == first {
            second = Button::random(rng);
        }
        [first, second]
    }

    /// The one button not in `pair`.
    ///
    /// Only meaningful for a pair of distinct buttons; for a repeated button
    /// the first remaining one in ascending order is returned.
    pub fn remaining(pair: [Button; 2]) -> Button {
        Button::ALL
            .into_iter()
            .find(|b| !pair.contains(b))
            .unwrap_or(Button::Two)
    }
}

// =============================================================================
// INPUT EVENTS
// =============================================================================

/// What the input collaborator reported for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    /// No edge this tick.
    #[default]
    None,
    /// The button transitioned to pressed.
    Pressed(Button),
}

impl InputEvent {
    /// Decode a raw event byte from the debouncer.
    ///
    /// `0` means no event. Unrecognized ids are dropped silently.
    pub const fn from_raw(raw: u8) -> Self {
        match Button::from_id(raw) {
            Some(button) => InputEvent::Pressed(button),
            None => InputEvent::None,
        }
    }

    /// Encode back to the raw byte (`0` for no event).
    pub const fn to_raw(self) -> u8 {
        match self {
            InputEvent::None => 0,
            InputEvent::Pressed(button) => button.id(),
        }
    }

    /// The pressed button, if any.
    #[inline]
    pub const fn pressed(self) -> Option<Button> {
        match self {
            InputEvent::None => None,
            InputEvent::Pressed(button) => Some(button),
        }
    }
}

// =============================================================================
// RECORDING
// =============================================================================

/// A press at a given tick index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick index (not milliseconds).
    pub tick: u32,
    /// Button that went down.
    pub button: Button,
}

/// Errors encoding or decoding a recording.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// bincode failed.
    #[error("recording codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Presses are not in strictly ascending tick order.
    #[error("recording presses out of order at tick {0}")]
    OutOfOrder(u32),
}

/// Complete input capture for one power-on run.
///
/// Ticks are sampled at a fixed period starting at `start_ms`, so tick `t`
/// happened at `start_ms + t * tick_ms` on the console clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecording {
    /// RNG seed the engine booted with.
    pub rng_seed: u64,
    /// Clock reading at tick 0.
    pub start_ms: Millis,
    /// Sampling period.
    pub tick_ms: Millis,
    /// Last recorded tick index.
    pub end_tick: u32,
    /// Only ticks that carried a press.
    presses: Vec<InputDelta>,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new(rng_seed: u64, start_ms: Millis, tick_ms: Millis) -> Self {
        Self {
            rng_seed,
            start_ms,
            tick_ms: tick_ms.max(1),
            end_tick: 0,
            presses: Vec::new(),
        }
    }

    /// Record the event sampled at `tick`. Idle ticks cost nothing.
    pub fn record(&mut self, tick: u32, event: InputEvent) {
        self.end_tick = self.end_tick.max(tick);

        if let InputEvent::Pressed(button) = event {
            match self.presses.last() {
                Some(last) if last.tick >= tick => {}
                _ => self.presses.push(InputDelta { tick, button }),
            }
        }
    }

    /// Event sampled at a specific tick.
    pub fn get_input_at(&self, tick: u32) -> InputEvent {
        match self.presses.binary_search_by_key(&tick, |d| d.tick) {
            Ok(idx) => InputEvent::Pressed(self.presses[idx].button),
            Err(_) => InputEvent::None,
        }
    }

    /// Clock reading for a tick index.
    #[inline]
    pub fn time_of(&self, tick: u32) -> Millis {
        self.start_ms.wrapping_add(tick.wrapping_mul(self.tick_ms))
    }

    /// Number of recorded presses.
    pub fn press_count(&self) -> usize {
        self.presses.len()
    }

    /// Mark the final tick (call when capture stops).
    pub fn finalize(&mut self, end_tick: u32) {
        self.end_tick = self.end_tick.max(end_tick);
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordingError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode with bincode, rejecting out-of-order press lists.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordingError> {
        let recording: InputRecording = bincode::deserialize(bytes)?;
        for pair in recording.presses.windows(2) {
            if pair[1].tick <= pair[0].tick {
                return Err(RecordingError::OutOfOrder(pair[1].tick));
            }
        }
        Ok(recording)
    }

    /// Iterate `(tick, clock, event)` for every tick from 0 to `end_tick`.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: 0,
            press_idx: 0,
            done: false,
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    press_idx: usize,
    done: bool,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, Millis, InputEvent);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.current_tick > self.recording.end_tick {
            return None;
        }

        let tick = self.current_tick;
        let event = match self.recording.presses.get(self.press_idx) {
            Some(delta) if delta.tick == tick => {
                self.press_idx += 1;
                InputEvent::Pressed(delta.button)
            }
            _ => InputEvent::None,
        };

        match self.current_tick.checked_add(1) {
            Some(next) => self.current_tick = next,
            None => self.done = true,
        }
        Some((tick, self.recording.time_of(tick), event))
    }
}

// =============================================================================
// TESTS
// =============================================================================
