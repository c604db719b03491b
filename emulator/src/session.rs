use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant as HostInstant};

use crossterm::style::Stylize;
use embassy_futures::block_on;
use interlock_core::controller::{
    CharacterDisplay, Clock, RelayDriver, SequenceController, SignalInputs,
};
use interlock_core::screens::{LCD_COLUMNS, LCD_ROWS};
use interlock_core::sequence::TestStep;
use interlock_core::signals::{ALL_INPUTS, INPUT_COUNT, InputId, PinLevel, input_by_id};
use interlock_core::telemetry::EventId;

const LOG_CAPACITY: usize = 256;
const DEFAULT_PRESS_MS: u64 = 200;
/// Longest host sleep before the sequence thread looks at the stop flag.
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(10);

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "press",
        "press [hold-ms]               - push the next button (default 200ms)",
    ),
    (
        "set",
        "set <input> <on|off>          - drive emergency|wall|start|request",
    ),
    (
        "show",
        "show                          - draw the 20x4 panel",
    ),
    (
        "status",
        "status                        - current step, inputs and relay",
    ),
    (
        "log",
        "log                           - telemetry recorded since the last `log`",
    ),
    (
        "help",
        "help [topic]                  - show help for a command",
    ),
];

/// Procedure clock running `scale` times faster than the host clock.
#[derive(Clone, Copy, Debug)]
pub struct HostTime {
    origin: HostInstant,
    scale: u32,
}

impl HostTime {
    pub fn new(scale: u32) -> Self {
        Self {
            origin: HostInstant::now(),
            scale: scale.max(1),
        }
    }

    pub fn now_ms(&self) -> u64 {
        let scaled = self.origin.elapsed().as_micros() * u128::from(self.scale) / 1_000;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    fn host_duration(&self, procedure: Duration) -> Duration {
        procedure / self.scale
    }
}

struct BenchState {
    levels: [PinLevel; INPUT_COUNT],
    press_until_ms: Option<u64>,
    panel: [[char; LCD_COLUMNS]; LCD_ROWS],
    cursor: (usize, usize),
    backlight: bool,
    relay_asserted: bool,
    step: TestStep,
    passes: u32,
    log: VecDeque<String>,
    stopping: bool,
}

impl BenchState {
    fn new() -> Self {
        let mut levels = [PinLevel::High; INPUT_COUNT];
        for line in &ALL_INPUTS {
            levels[line.id.as_index()] = line.polarity.inactive_level();
        }

        Self {
            levels,
            press_until_ms: None,
            panel: [[' '; LCD_COLUMNS]; LCD_ROWS],
            cursor: (0, 0),
            backlight: false,
            relay_asserted: false,
            step: TestStep::EmergencyStop,
            passes: 0,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            stopping: false,
        }
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

type SharedBench = Arc<Mutex<BenchState>>;

fn lock(bench: &SharedBench) -> MutexGuard<'_, BenchState> {
    bench.lock().unwrap_or_else(PoisonError::into_inner)
}

struct HostPanel(SharedBench);

impl CharacterDisplay for HostPanel {
    fn clear(&mut self) {
        let mut state = lock(&self.0);
        state.panel = [[' '; LCD_COLUMNS]; LCD_ROWS];
        state.cursor = (0, 0);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        lock(&self.0).cursor = (usize::from(col), usize::from(row));
    }

    fn print(&mut self, text: &str) {
        let mut state = lock(&self.0);
        let (mut col, row) = state.cursor;
        for ch in text.chars() {
            if col < LCD_COLUMNS && row < LCD_ROWS {
                state.panel[row][col] = ch;
            }
            col += 1;
        }
        state.cursor = (col, row);
    }

    fn set_backlight(&mut self, on: bool) {
        lock(&self.0).backlight = on;
    }
}

struct HostInputs {
    bench: SharedBench,
    time: HostTime,
    /// Advance button reading handed out while the session shuts down.
    stop_pressed: bool,
}

impl SignalInputs for HostInputs {
    fn level(&mut self, input: InputId) -> PinLevel {
        let state = lock(&self.bench);
        if input == InputId::AdvanceButton && state.stopping {
            // Alternate so every press and release wait falls through.
            self.stop_pressed = !self.stop_pressed;
            return if self.stop_pressed {
                PinLevel::Low
            } else {
                PinLevel::High
            };
        }
        if input == InputId::AdvanceButton
            && state
                .press_until_ms
                .is_some_and(|until| self.time.now_ms() < until)
        {
            return PinLevel::Low;
        }
        state.levels[input.as_index()]
    }
}

struct HostRelay(SharedBench);

impl RelayDriver for HostRelay {
    fn set_asserted(&mut self, asserted: bool) {
        lock(&self.0).relay_asserted = asserted;
    }
}

struct HostClock {
    bench: SharedBench,
    time: HostTime,
}

impl Clock for HostClock {
    fn now_ms(&self) -> u64 {
        self.time.now_ms()
    }

    /// Sleeps in short slices and returns early once the session stops.
    async fn delay(&mut self, duration: Duration) {
        let mut remaining = self.time.host_duration(duration);
        while !remaining.is_zero() && !lock(&self.bench).stopping {
            let slice = remaining.min(STOP_CHECK_INTERVAL);
            thread::sleep(slice);
            remaining -= slice;
        }
    }
}

fn spawn_sequence(bench: SharedBench, time: HostTime) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("sequence".to_string())
        .spawn(move || {
            let mut controller = SequenceController::new(
                HostPanel(bench.clone()),
                HostInputs {
                    bench: bench.clone(),
                    time,
                    stop_pressed: false,
                },
                HostRelay(bench.clone()),
                HostClock {
                    bench: bench.clone(),
                    time,
                },
            );
            let mut last_logged: Option<EventId> = None;

            block_on(async {
                controller.begin();
                loop {
                    controller.poll().await;

                    let mut state = lock(&bench);
                    state.step = controller.current_step();
                    state.passes = controller.passes_completed();
                    for record in controller.telemetry().records_after(last_logged) {
                        state.push_log(format!(
                            "t={}ms {}",
                            record.timestamp_ms, record.event
                        ));
                        last_logged = Some(record.id);
                    }
                    if state.stopping {
                        break;
                    }
                }
            });
        })
}

/// Operator console wrapped around a controller running on its own thread.
pub struct Session {
    bench: SharedBench,
    time: HostTime,
    worker: Option<thread::JoinHandle<()>>,
}

impl Session {
    pub fn new(time_scale: u32) -> io::Result<Self> {
        let bench = Arc::new(Mutex::new(BenchState::new()));
        let time = HostTime::new(time_scale);
        let worker = spawn_sequence(bench.clone(), time)?;
        Ok(Self {
            bench,
            time,
            worker: Some(worker),
        })
    }

    pub fn handle_command(&mut self, line: &str) -> Vec<String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Vec::new();
        };

        match command.to_ascii_lowercase().as_str() {
            "help" => handle_help(words.next()),
            "press" => self.handle_press(words.next()),
            "set" => self.handle_set(words.next(), words.next()),
            "show" => self.panel_lines(),
            "status" => self.status_lines(),
            "log" => self.drain_log(),
            other => vec![format!("ERR unknown command `{other}`; type `help`")],
        }
    }

    fn handle_press(&mut self, hold: Option<&str>) -> Vec<String> {
        let hold_ms = match hold.map(str::parse::<u64>) {
            None => DEFAULT_PRESS_MS,
            Some(Ok(value)) if value > 0 => value,
            Some(_) => return vec!["ERR press expects a hold time in ms".to_string()],
        };

        lock(&self.bench).press_until_ms = Some(self.time.now_ms() + hold_ms);
        vec![format!("OK press hold={hold_ms}ms")]
    }

    fn handle_set(&mut self, input: Option<&str>, value: Option<&str>) -> Vec<String> {
        let Some(id) = input.and_then(parse_input) else {
            return vec!["ERR set expects one of emergency|wall|start|request".to_string()];
        };
        let active = match value.map(str::to_ascii_lowercase).as_deref() {
            Some("on") => true,
            Some("off") => false,
            _ => return vec!["ERR set expects `on` or `off`".to_string()],
        };

        let line = input_by_id(id);
        let level = if active {
            line.polarity.active_level()
        } else {
            line.polarity.inactive_level()
        };
        lock(&self.bench).levels[id.as_index()] = level;
        vec![format!("OK {} {} ({level:?})", line.name, if active { "on" } else { "off" })]
    }

    /// Panel contents as plain text, one entry per row.
    pub fn panel_text(&self) -> Vec<String> {
        lock(&self.bench)
            .panel
            .iter()
            .map(|row| row.iter().collect())
            .collect()
    }

    fn panel_lines(&self) -> Vec<String> {
        let backlight = lock(&self.bench).backlight;
        let border = format!("+{}+", "-".repeat(LCD_COLUMNS));

        let mut lines = vec![border.clone()];
        for row in self.panel_text() {
            let cell = if backlight {
                row.black().on_green().to_string()
            } else {
                row.dark_grey().to_string()
            };
            lines.push(format!("|{cell}|"));
        }
        lines.push(border);
        lines
    }

    fn status_lines(&self) -> Vec<String> {
        let state = lock(&self.bench);
        let mut lines = vec![format!(
            "step {} {} (passes completed: {})",
            state.step.number(),
            state.step.label(),
            state.passes
        )];

        for line in &ALL_INPUTS {
            let level = state.levels[line.id.as_index()];
            let active = if line.id == InputId::AdvanceButton {
                state
                    .press_until_ms
                    .is_some_and(|until| self.time.now_ms() < until)
            } else {
                line.is_active(level)
            };
            let label = if active { "active" } else { "inactive" };
            lines.push(format!(
                "  {:<13} {:<4} {label:<8} {}",
                line.name, line.mcu_pin, line.meaning
            ));
        }

        let relay = if state.relay_asserted {
            "relay ASSERTED".red().bold().to_string()
        } else {
            "relay released".to_string()
        };
        lines.push(format!("  {relay}"));
        lines
    }

    fn drain_log(&mut self) -> Vec<String> {
        let mut state = lock(&self.bench);
        if state.log.is_empty() {
            return vec!["(no new telemetry)".to_string()];
        }
        state.log.drain(..).collect()
    }
}

impl Drop for Session {
    /// Stops the sequence thread and waits for it to exit.
    fn drop(&mut self) {
        lock(&self.bench).stopping = true;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            eprintln!("sequence thread panicked");
        }
    }
}

fn handle_help(topic: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    match topic {
        Some(target) => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                lines.push((*detail).to_string());
            } else {
                lines.push(format!("No help available for `{target}`."));
                lines.push(format!("Available topics: {}", help_topic_list()));
            }
        }
        None => {
            lines.push("Available commands:".to_string());
            for (_, detail) in HELP_TOPICS {
                lines.push(format!("  {detail}"));
            }
            lines.push("Type `help <topic>` for a specific command.".to_string());
        }
    }
    lines
}

fn help_topic_list() -> String {
    HELP_TOPICS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_input(tag: &str) -> Option<InputId> {
    match tag.to_ascii_lowercase().as_str() {
        "emergency" | "estop" => Some(InputId::EmergencyStop),
        "wall" => Some(InputId::WallSwitch),
        "start" => Some(InputId::StartSignal),
        "request" | "shutdown" => Some(InputId::ShutdownRequest),
        _ => None,
    }
}
