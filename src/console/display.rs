//! Display Collaborator
//!
//! The console front panel: a four-character segment display and a row of
//! indicator lights. The engine never talks to it directly; the driver pushes
//! composed frames through this trait.

use crate::game::frame::{format_number, Frame};
use crate::INDICATOR_COUNT;

/// Front panel output.
pub trait Display {
    /// Show up to four characters.
    fn render_text(&mut self, text: &str);

    /// Show a number right-justified in four columns.
    fn render_number(&mut self, value: u32) {
        self.render_text(&format_number(value));
    }

    /// Light `count` indicators (0 = all off). Values above the
    /// indicator count are clamped.
    fn set_indicators(&mut self, count: u8);
}

/// Display that remembers everything it was asked to show.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingDisplay {
    text: String,
    indicators: u8,
    history: Vec<Frame>,
}

impl RecordingDisplay {
    /// Blank display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently shown.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Indicators currently lit.
    pub fn indicators(&self) -> u8 {
        self.indicators
    }

    /// Every state the panel has been in, oldest first.
    pub fn history(&self) -> &[Frame] {
        &self.history
    }

    fn snapshot(&mut self) {
        self.history.push(Frame::new(self.text.clone(), self.indicators));
    }
}

impl Display for RecordingDisplay {
    fn render_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.snapshot();
    }

    fn set_indicators(&mut self, count: u8) {
        self.indicators = count.min(INDICATOR_COUNT);
        self.snapshot();
    }
}
