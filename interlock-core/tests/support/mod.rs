//! Simulated test bench shared by the integration tests.
//!
//! One [`Bench`] value implements every collaborator trait. Clones share the
//! same state, so a test keeps a handle for scripting and inspection while the
//! controller owns the others. Time only moves when the controller awaits a
//! delay.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use embassy_futures::block_on;
use interlock_core::controller::{
    CharacterDisplay, Clock, RelayDriver, SequenceController, SignalInputs,
};
use interlock_core::screens::{LCD_COLUMNS, LCD_ROWS};
use interlock_core::sequence::TestStep;
use interlock_core::signals::{ALL_INPUTS, INPUT_COUNT, InputId, PinLevel, input_by_id};
use interlock_core::telemetry::TelemetryEventKind;

/// Virtual time after which the bench assumes the controller is stuck.
pub const DEFAULT_HORIZON_MS: u64 = 30 * 60 * 1_000;

/// How long a scripted operator holds the button.
pub const OPERATOR_HOLD_MS: u64 = 200;

pub type BenchController = SequenceController<Bench, Bench, Bench, Bench>;

struct Reaction {
    needle: &'static str,
    hold_ms: u64,
}

struct BenchState {
    now_ms: u64,
    horizon_ms: u64,
    levels: [PinLevel; INPUT_COUNT],
    timeline: Vec<(u64, InputId, PinLevel)>,
    presses: Vec<(u64, u64)>,
    operator: VecDeque<Reaction>,
    panel: [[char; LCD_COLUMNS]; LCD_ROWS],
    cursor: (usize, usize),
    prints: Vec<(u64, String)>,
    relay: Vec<(u64, bool)>,
    backlight: bool,
}

impl BenchState {
    fn level(&self, input: InputId) -> PinLevel {
        if input == InputId::AdvanceButton
            && self
                .presses
                .iter()
                .any(|&(start, end)| (start..end).contains(&self.now_ms))
        {
            return PinLevel::Low;
        }

        self.timeline
            .iter()
            .filter(|(at, id, _)| *id == input && *at <= self.now_ms)
            .max_by_key(|(at, _, _)| *at)
            .map_or(self.levels[input.as_index()], |(_, _, level)| *level)
    }

    fn react_to(&mut self, text: &str) {
        let fire = self
            .operator
            .front()
            .is_some_and(|reaction| text.contains(reaction.needle));
        if fire {
            if let Some(reaction) = self.operator.pop_front() {
                self.presses
                    .push((self.now_ms, self.now_ms + reaction.hold_ms));
            }
        }
    }
}

#[derive(Clone)]
pub struct Bench {
    state: Rc<RefCell<BenchState>>,
}

impl Bench {
    /// Bench with every input released and no operator script.
    pub fn new() -> Self {
        let mut levels = [PinLevel::High; INPUT_COUNT];
        for line in &ALL_INPUTS {
            levels[line.id.as_index()] = line.polarity.inactive_level();
        }

        Self {
            state: Rc::new(RefCell::new(BenchState {
                now_ms: 0,
                horizon_ms: DEFAULT_HORIZON_MS,
                levels,
                timeline: Vec::new(),
                presses: Vec::new(),
                operator: VecDeque::new(),
                panel: [[' '; LCD_COLUMNS]; LCD_ROWS],
                cursor: (0, 0),
                prints: Vec::new(),
                relay: Vec::new(),
                backlight: false,
            })),
        }
    }

    /// Builds a controller wired to this bench and runs its startup.
    pub fn controller(&self) -> BenchController {
        let mut controller =
            SequenceController::new(self.clone(), self.clone(), self.clone(), self.clone());
        controller.begin();
        controller
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    /// Holds `input` at its asserted level from now on.
    pub fn assert_input(&self, input: InputId) {
        let level = input_by_id(input)
            .polarity
            .active_level();
        self.state.borrow_mut().levels[input.as_index()] = level;
    }

    /// Schedules `input` to change to `level` at `at_ms`.
    pub fn schedule(&self, at_ms: u64, input: InputId, level: PinLevel) {
        self.state.borrow_mut().timeline.push((at_ms, input, level));
    }

    /// Holds the advance button from `start_ms` for `hold_ms`.
    pub fn press(&self, start_ms: u64, hold_ms: u64) {
        self.state
            .borrow_mut()
            .presses
            .push((start_ms, start_ms + hold_ms));
    }

    /// Queues an operator who presses the button as soon as `needle` is shown.
    /// Reactions fire in the order they were queued, each at most once.
    pub fn operator_presses_on(&self, needle: &'static str) {
        self.state.borrow_mut().operator.push_back(Reaction {
            needle,
            hold_ms: OPERATOR_HOLD_MS,
        });
    }

    pub fn operator_idle(&self) -> bool {
        self.state.borrow().operator.is_empty()
    }

    /// Returns `true` when any print so far contained `needle`.
    pub fn shown(&self, needle: &str) -> bool {
        self.state
            .borrow()
            .prints
            .iter()
            .any(|(_, text)| text.contains(needle))
    }

    /// Time of the first print containing `needle`.
    pub fn first_shown_at(&self, needle: &str) -> Option<u64> {
        self.state
            .borrow()
            .prints
            .iter()
            .find(|(_, text)| text.contains(needle))
            .map(|(at, _)| *at)
    }

    /// Current contents of one panel row.
    pub fn row(&self, row: usize) -> String {
        self.state.borrow().panel[row].iter().collect()
    }

    pub fn relay_history(&self) -> Vec<(u64, bool)> {
        self.state.borrow().relay.clone()
    }

    pub fn backlight(&self) -> bool {
        self.state.borrow().backlight
    }
}

impl CharacterDisplay for Bench {
    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.panel = [[' '; LCD_COLUMNS]; LCD_ROWS];
        state.cursor = (0, 0);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.state.borrow_mut().cursor = (usize::from(col), usize::from(row));
    }

    fn print(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        let (mut col, row) = state.cursor;
        for ch in text.chars() {
            if col < LCD_COLUMNS && row < LCD_ROWS {
                state.panel[row][col] = ch;
            }
            col += 1;
        }
        state.cursor = (col, row);

        let now = state.now_ms;
        state.prints.push((now, text.to_owned()));
        state.react_to(text);
    }

    fn set_backlight(&mut self, on: bool) {
        self.state.borrow_mut().backlight = on;
    }
}

impl SignalInputs for Bench {
    fn level(&mut self, input: InputId) -> PinLevel {
        self.state.borrow().level(input)
    }
}

impl RelayDriver for Bench {
    fn set_asserted(&mut self, asserted: bool) {
        let mut state = self.state.borrow_mut();
        let now = state.now_ms;
        state.relay.push((now, asserted));
    }
}

impl Clock for Bench {
    fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    async fn delay(&mut self, duration: Duration) {
        let mut state = self.state.borrow_mut();
        state.now_ms += u64::try_from(duration.as_millis()).expect("delay fits in u64");
        assert!(
            state.now_ms <= state.horizon_ms,
            "controller still waiting after {} ms on the bench",
            state.horizon_ms
        );
    }
}

/// Polls until the controller reaches `step`, returning the poll count.
pub fn run_until_step(controller: &mut BenchController, step: TestStep) -> usize {
    run_until(controller, |controller| controller.current_step() == step)
}

/// Polls until `done` holds. The bench horizon bounds the run.
pub fn run_until(
    controller: &mut BenchController,
    mut done: impl FnMut(&BenchController) -> bool,
) -> usize {
    let mut polls = 0;
    while !done(controller) {
        block_on(controller.poll());
        polls += 1;
    }
    polls
}

/// Number of recorded events equal to `event`.
pub fn count_events(controller: &BenchController, event: TelemetryEventKind) -> usize {
    controller
        .telemetry()
        .oldest_first()
        .filter(|record| record.event == event)
        .count()
}

/// Timestamps of every recorded event equal to `event`.
pub fn event_times(controller: &BenchController, event: TelemetryEventKind) -> Vec<u64> {
    controller
        .telemetry()
        .oldest_first()
        .filter(|record| record.event == event)
        .map(|record| record.timestamp_ms)
        .collect()
}
