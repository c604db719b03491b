//! Screen catalog for the 20x4 character panel.
//!
//! Every message the technician sees is a constant here, positioned exactly
//! where the bench instructions expect it. Handlers pick screens; they never
//! build text themselves, apart from the countdown labels.

use core::fmt::Write;

use heapless::String;

use crate::sequence::timing::{INTRO_COUNTDOWN_SECS, SHUTDOWN_COUNTDOWN_SECS};
use crate::sequence::TestStep;

/// Panel width in characters.
pub const LCD_COLUMNS: usize = 20;
/// Panel height in rows.
pub const LCD_ROWS: usize = 4;

/// Literal text placed at a fixed cursor position.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TextLine {
    pub col: u8,
    pub row: u8,
    pub text: &'static str,
}

impl TextLine {
    pub const fn new(col: u8, row: u8, text: &'static str) -> Self {
        Self { col, row, text }
    }
}

/// A full panel: cleared, then each line written in order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Screen {
    pub lines: &'static [TextLine],
}

impl Screen {
    pub const fn new(lines: &'static [TextLine]) -> Self {
        Self { lines }
    }
}

/// How the remaining seconds are rendered.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CountdownStyle {
    /// `Waiting :Ns `
    Waiting,
    /// `Ns `
    Bare,
}

/// One-second countdown rendered in place.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Countdown {
    pub seconds: u8,
    pub col: u8,
    pub row: u8,
    pub style: CountdownStyle,
}

impl Countdown {
    pub const fn new(seconds: u8, col: u8, row: u8, style: CountdownStyle) -> Self {
        Self {
            seconds,
            col,
            row,
            style,
        }
    }

    /// Text shown while `remaining` seconds are left. The trailing space
    /// blanks the leftover digit when the count drops from two digits to one.
    #[must_use]
    pub fn label(&self, remaining: u8) -> String<LCD_COLUMNS> {
        let mut text = String::new();
        let written = match self.style {
            CountdownStyle::Waiting => write!(text, "Waiting :{remaining}s "),
            CountdownStyle::Bare => write!(text, "{remaining}s "),
        };
        debug_assert!(written.is_ok(), "countdown label overflows a panel row");
        text
    }
}

/// Banner and countdown played once per entry into a step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StepIntro {
    pub banner: Screen,
    pub countdown: Countdown,
}

pub const EMERGENCY_BANNER: Screen = Screen::new(&[
    TextLine::new(3, 0, " First test : "),
    TextLine::new(3, 1, "EMERGENCY STOP"),
]);

pub const EMERGENCY_OK: Screen = Screen::new(&[
    TextLine::new(1, 0, "EMERGENCY STOP OK"),
    TextLine::new(1, 2, "Push next button"),
    TextLine::new(1, 3, "if the test is OK"),
]);

pub const EMERGENCY_NOK: Screen = Screen::new(&[
    TextLine::new(1, 0, "EMERGENCY STOP NOK"),
    TextLine::new(1, 2, "Push next button"),
    TextLine::new(1, 3, "if the test is OK"),
]);

pub const WALL_SWITCH_BANNER: Screen = Screen::new(&[
    TextLine::new(3, 0, "Second test :"),
    TextLine::new(5, 1, "Check the"),
    TextLine::new(2, 2, "POWER SUPPLY 24V"),
]);

pub const WALL_SWITCH_PRESENT: Screen = Screen::new(&[
    TextLine::new(0, 0, "WALL SWITCH PRESENT"),
    TextLine::new(1, 1, "Push next button"),
    TextLine::new(3, 2, "if the test is"),
    TextLine::new(0, 3, "WALL SWITCH PRESENT"),
]);

pub const WALL_SWITCH_MISSING: Screen = Screen::new(&[
    TextLine::new(0, 0, "WALL SWITCH MISSING"),
    TextLine::new(1, 1, "Push next button"),
    TextLine::new(3, 2, "if the test is"),
    TextLine::new(0, 3, "WALL SWITCH PRESENT"),
]);

pub const START_SCANNER_BANNER: Screen = Screen::new(&[
    TextLine::new(1, 0, "Third test: check"),
    TextLine::new(2, 1, " if the SCANNER"),
    TextLine::new(5, 2, "STARTS UP"),
]);

pub const START_CHOICE: Screen = Screen::new(&[
    TextLine::new(5, 0, "IF FORCE:"),
    TextLine::new(1, 1, "Push next button"),
    TextLine::new(0, 2, "If X.CITE|CEED|GO :"),
    TextLine::new(0, 3, "Push little button"),
]);

pub const GANTRY_ENERGIZED: Screen = Screen::new(&[
    TextLine::new(2, 0, "GANTRY SHOULD BE"),
    TextLine::new(6, 1, "ENERGIZED"),
    TextLine::new(0, 2, "Push next button if"),
    TextLine::new(0, 3, "Gantry is ENERGIZED"),
]);

pub const FORCE_INSTRUCTIONS: Screen = Screen::new(&[
    TextLine::new(3, 0, "Test force:"),
    TextLine::new(2, 1, "Push the GREEN"),
    TextLine::new(5, 2, "button on"),
    TextLine::new(0, 3, "electrical cabinet"),
]);

pub const FORCE_CONFIRM: Screen = Screen::new(&[
    TextLine::new(3, 0, "Did the Force"),
    TextLine::new(2, 1, "system start up"),
    TextLine::new(0, 2, "without any issues?"),
    TextLine::new(1, 3, "If YES: push next"),
]);

pub const SHUTDOWN_REQUEST_BANNER: Screen = Screen::new(&[
    TextLine::new(4, 0, "Fourth test :"),
    TextLine::new(6, 1, "Check the"),
    TextLine::new(2, 2, "SHUTDOWN REQUEST"),
]);

pub const RED_BUTTON_PROMPT: Screen = Screen::new(&[
    TextLine::new(0, 0, "Push the RED BUTTON"),
    TextLine::new(3, 1, "on electrical"),
    TextLine::new(6, 2, "cabinet"),
]);

pub const SHUTDOWN_REQUEST_OK: Screen = Screen::new(&[
    TextLine::new(0, 0, "SHUTDOWN REQUEST OK"),
    TextLine::new(2, 1, "If the test is :"),
    TextLine::new(0, 2, "Shutdown request OK"),
    TextLine::new(0, 3, "=> Push next button"),
]);

pub const SHUTDOWN_COMMAND_BANNER: Screen = Screen::new(&[
    TextLine::new(2, 0, "The system will"),
    TextLine::new(3, 1, "shut down in :"),
]);

pub const CLEAN_SHUTDOWN_PROMPT: Screen = Screen::new(&[
    TextLine::new(2, 0, "Did the system "),
    TextLine::new(1, 1, "shut down without"),
    TextLine::new(4, 2, "any issues ?"),
    TextLine::new(0, 3, "If YES : push next!"),
]);

pub const SHUTDOWN_COMMAND_OK: Screen = Screen::new(&[
    TextLine::new(0, 0, "SHUTDOWN COMMAND OK"),
    TextLine::new(1, 1, "If the test is :"),
    TextLine::new(0, 2, "Shutdown command OK"),
    TextLine::new(0, 3, "=> Push next button"),
]);

pub const INDICATOR_CHECK: Screen = Screen::new(&[
    TextLine::new(4, 0, "FINAL TEST:"),
    TextLine::new(0, 1, "Check the indicator"),
    TextLine::new(0, 2, "lights for X_RAY ON"),
    TextLine::new(2, 3, "and X_RAY READY"),
]);

pub const TESTS_COMPLETE: Screen = Screen::new(&[
    TextLine::new(0, 0, "If the X-RAY tests"),
    TextLine::new(2, 1, "are completed :"),
    TextLine::new(0, 2, "Press next button &"),
    TextLine::new(0, 3, "TURN OFF the casing"),
]);

/// Banner and countdown for `step`.
#[must_use]
pub const fn intro_for(step: TestStep) -> StepIntro {
    match step {
        TestStep::EmergencyStop => StepIntro {
            banner: EMERGENCY_BANNER,
            countdown: Countdown::new(INTRO_COUNTDOWN_SECS, 4, 2, CountdownStyle::Waiting),
        },
        TestStep::WallSwitchFeedback => StepIntro {
            banner: WALL_SWITCH_BANNER,
            countdown: Countdown::new(INTRO_COUNTDOWN_SECS, 4, 3, CountdownStyle::Waiting),
        },
        TestStep::StartScanner => StepIntro {
            banner: START_SCANNER_BANNER,
            countdown: Countdown::new(INTRO_COUNTDOWN_SECS, 4, 3, CountdownStyle::Waiting),
        },
        TestStep::ShutdownRequest => StepIntro {
            banner: SHUTDOWN_REQUEST_BANNER,
            countdown: Countdown::new(INTRO_COUNTDOWN_SECS, 4, 3, CountdownStyle::Waiting),
        },
        TestStep::ShutdownCommand => StepIntro {
            banner: SHUTDOWN_COMMAND_BANNER,
            countdown: Countdown::new(SHUTDOWN_COUNTDOWN_SECS, 9, 2, CountdownStyle::Bare),
        },
    }
}
