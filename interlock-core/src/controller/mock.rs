//! In-memory collaborators for unit tests.

use core::cell::Cell;
use core::time::Duration;

use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::signals::{ALL_INPUTS, INPUT_COUNT, InputId, PinLevel};

use super::{CharacterDisplay, Clock, RelayDriver, SignalInputs};

/// Virtual time shared by the mock clock and the mock inputs.
#[derive(Clone, Debug, Default)]
pub struct SharedTime(Rc<Cell<u64>>);

impl SharedTime {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

/// Clock that advances virtual time instead of sleeping.
pub struct MockClock {
    time: SharedTime,
    horizon_ms: u64,
}

impl MockClock {
    pub fn new(time: SharedTime) -> Self {
        Self {
            time,
            horizon_ms: 3_600_000,
        }
    }

    pub fn advance(&mut self, ms: u64) {
        self.time.advance(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.time.now()
    }

    async fn delay(&mut self, duration: Duration) {
        let ms = u64::try_from(duration.as_millis()).expect("delay fits in u64");
        self.time.advance(ms);
        assert!(
            self.time.now() <= self.horizon_ms,
            "virtual time passed {} ms; the controller is stuck waiting",
            self.horizon_ms
        );
    }
}

/// Static input levels plus scheduled advance-button presses.
pub struct MockInputs {
    time: SharedTime,
    levels: [PinLevel; INPUT_COUNT],
    presses: Vec<(u64, u64)>,
}

impl MockInputs {
    /// Every line starts at its inactive level.
    pub fn new(time: SharedTime) -> Self {
        let mut levels = [PinLevel::High; INPUT_COUNT];
        for line in &ALL_INPUTS {
            levels[line.id.as_index()] = line.polarity.inactive_level();
        }
        Self {
            time,
            levels,
            presses: Vec::new(),
        }
    }

    pub fn set(&mut self, input: InputId, level: PinLevel) {
        self.levels[input.as_index()] = level;
    }

    /// Holds the advance button down from `start_ms` for `hold_ms`.
    pub fn press(&mut self, start_ms: u64, hold_ms: u64) {
        self.presses.push((start_ms, start_ms + hold_ms));
    }
}

impl SignalInputs for MockInputs {
    fn level(&mut self, input: InputId) -> PinLevel {
        if input == InputId::AdvanceButton {
            let now = self.time.now();
            if self
                .presses
                .iter()
                .any(|&(start, end)| (start..end).contains(&now))
            {
                return PinLevel::Low;
            }
        }
        self.levels[input.as_index()]
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrintedLine {
    pub col: u8,
    pub row: u8,
    pub text: String,
}

/// Display that keeps every print, including those later cleared.
#[derive(Default)]
pub struct MockDisplay {
    cursor: (u8, u8),
    backlight: bool,
    lines: Vec<PrintedLine>,
}

impl MockDisplay {
    pub fn lines(&self) -> &[PrintedLine] {
        &self.lines
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }
}

impl CharacterDisplay for MockDisplay {
    fn clear(&mut self) {
        self.cursor = (0, 0);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (col, row);
    }

    fn print(&mut self, text: &str) {
        let (col, row) = self.cursor;
        self.lines.push(PrintedLine {
            col,
            row,
            text: text.to_string(),
        });
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }
}

#[derive(Default)]
pub struct MockRelay {
    history: Vec<bool>,
}

impl MockRelay {
    pub fn history(&self) -> &[bool] {
        &self.history
    }
}

impl RelayDriver for MockRelay {
    fn set_asserted(&mut self, asserted: bool) {
        self.history.push(asserted);
    }
}
