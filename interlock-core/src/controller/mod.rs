//! Sequence controller shared between firmware and host targets.
//!
//! [`SequenceController`] owns the current [`TestStep`], the per-step flags,
//! the shared sampling gate and the debounced advance button. Hardware is
//! reached only through the collaborator traits below, so the firmware, the
//! emulator and the tests all drive the same state machine.
//!
//! Every wait in the procedure (countdowns, dwells, button press and release)
//! is an `await` on [`Clock::delay`]. Nothing else runs while a step waits;
//! there is no cancellation.

use core::time::Duration;

use crate::screens::{
    self, CLEAN_SHUTDOWN_PROMPT, Countdown, EMERGENCY_NOK, EMERGENCY_OK, FORCE_CONFIRM,
    FORCE_INSTRUCTIONS, GANTRY_ENERGIZED, INDICATOR_CHECK, RED_BUTTON_PROMPT, START_CHOICE,
    SHUTDOWN_COMMAND_OK, SHUTDOWN_REQUEST_OK, Screen, TESTS_COMPLETE, WALL_SWITCH_MISSING,
    WALL_SWITCH_PRESENT,
};
use crate::sequence::timing::{
    COUNTDOWN_TICK, FORCE_START_DWELL, INDICATOR_CHECK_DWELL, INPUT_POLL_INTERVAL,
};
use crate::sequence::{EntryCause, StepFlags, TestStep, Transition};
use crate::signals::{INPUT_COUNT, InputId, PinLevel, input_by_id};
use crate::telemetry::{StartPath, TelemetryEventKind, TelemetryRecorder};

pub mod button;
pub mod gate;
#[cfg(test)]
pub(crate) mod mock;

pub use button::AdvanceButton;
pub use gate::SamplingGate;

/// Character panel used as an output sink.
pub trait CharacterDisplay {
    /// Blanks the panel and homes the cursor.
    fn clear(&mut self);

    /// Moves the cursor to `col`, `row` (both zero based).
    fn set_cursor(&mut self, col: u8, row: u8);

    /// Writes `text` starting at the cursor.
    fn print(&mut self, text: &str);

    /// Switches the backlight.
    fn set_backlight(&mut self, on: bool);
}

/// Raw access to the monitored inputs and the advance button.
pub trait SignalInputs {
    /// Reads the current electrical level of `input`.
    fn level(&mut self, input: InputId) -> PinLevel;
}

/// Abstraction over the shutdown command relay.
pub trait RelayDriver {
    /// Drives the relay to its asserted or released level.
    fn set_asserted(&mut self, asserted: bool);
}

/// Monotonic time source with an awaitable delay.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Suspends the caller for `duration`.
    async fn delay(&mut self, duration: Duration);
}

/// Drives the five-step interlock acceptance procedure.
pub struct SequenceController<D, I, R, C> {
    display: D,
    inputs: I,
    relay: R,
    clock: C,
    step: TestStep,
    flags: StepFlags,
    gate: SamplingGate,
    button: AdvanceButton,
    telemetry: TelemetryRecorder,
    last_active: [Option<bool>; INPUT_COUNT],
    passes_completed: u32,
}

impl<D, I, R, C> SequenceController<D, I, R, C>
where
    D: CharacterDisplay,
    I: SignalInputs,
    R: RelayDriver,
    C: Clock,
{
    /// Creates a controller positioned on the first step. Call [`Self::begin`]
    /// before polling.
    pub fn new(display: D, inputs: I, relay: R, clock: C) -> Self {
        Self {
            display,
            inputs,
            relay,
            clock,
            step: TestStep::EmergencyStop,
            flags: StepFlags::new(),
            gate: SamplingGate::default(),
            button: AdvanceButton::new(),
            telemetry: TelemetryRecorder::new(),
            last_active: [None; INPUT_COUNT],
            passes_completed: 0,
        }
    }

    /// Puts the outputs in their idle state: backlight on, blank panel,
    /// relay released.
    pub fn begin(&mut self) {
        self.display.set_backlight(true);
        self.display.clear();
        self.relay.set_asserted(false);
        self.record(TelemetryEventKind::StepEntered(self.step, EntryCause::Startup));
    }

    /// Step currently being run.
    pub const fn current_step(&self) -> TestStep {
        self.step
    }

    /// Per-step flags for the current pass.
    pub const fn flags(&self) -> &StepFlags {
        &self.flags
    }

    /// Number of full passes that reached the final confirmation.
    pub const fn passes_completed(&self) -> u32 {
        self.passes_completed
    }

    /// Recorded telemetry.
    pub const fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    /// The display collaborator.
    pub const fn display(&self) -> &D {
        &self.display
    }

    /// The clock collaborator.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs one iteration of the control loop and returns the resulting step.
    ///
    /// The advance button is checked first; a debounced press moves to the
    /// cyclic successor. The current step's handler then runs and may itself
    /// return a forced transition.
    pub async fn poll(&mut self) -> TestStep {
        if self
            .button
            .poll_advance(&mut self.inputs, &mut self.clock)
            .await
        {
            self.apply(Transition::AdvanceGeneric);
        }

        let transition = self.dispatch().await;
        self.apply(transition);

        self.clock.delay(INPUT_POLL_INTERVAL).await;
        self.step
    }

    async fn dispatch(&mut self) -> Transition {
        if self.step.uses_sampling_gate() && !self.gate.due(self.clock.now_ms()) {
            return Transition::Stay;
        }

        match self.step {
            TestStep::EmergencyStop => {
                self.polled_status(
                    TestStep::EmergencyStop,
                    InputId::EmergencyStop,
                    EMERGENCY_OK,
                    EMERGENCY_NOK,
                )
                .await
            }
            TestStep::WallSwitchFeedback => {
                self.polled_status(
                    TestStep::WallSwitchFeedback,
                    InputId::WallSwitch,
                    WALL_SWITCH_PRESENT,
                    WALL_SWITCH_MISSING,
                )
                .await
            }
            TestStep::StartScanner => self.start_scanner().await,
            TestStep::ShutdownRequest => self.shutdown_request().await,
            TestStep::ShutdownCommand => self.shutdown_command().await,
        }
    }

    fn apply(&mut self, transition: Transition) {
        let cause = match transition {
            Transition::Stay => return,
            Transition::AdvanceGeneric => EntryCause::Advance,
            Transition::JumpTo(_) => EntryCause::Forced,
        };

        let next = transition.resolve(self.step);
        if next == self.step {
            return;
        }

        self.flags.reset(next);
        self.step = next;
        self.record(TelemetryEventKind::StepEntered(next, cause));
    }

    /// Steps 1 and 2: informational status only, left through the generic
    /// advance.
    async fn polled_status(
        &mut self,
        step: TestStep,
        input: InputId,
        active: Screen,
        inactive: Screen,
    ) -> Transition {
        self.play_intro(step).await;

        if self.sample(input) {
            self.render(active);
        } else {
            self.render(inactive);
        }
        Transition::Stay
    }

    async fn start_scanner(&mut self) -> Transition {
        let step = TestStep::StartScanner;
        if !self.flags.countdown_done(step) {
            let intro = screens::intro_for(step);
            self.render(intro.banner);
            self.countdown(step, intro.countdown).await;
            self.render(START_CHOICE);
            self.flags.mark_countdown_done(step);
        }

        let path = loop {
            if self.sample(InputId::StartSignal) {
                self.render(GANTRY_ENERGIZED);
                self.confirm(step).await;
                break StartPath::SignalReceived;
            }

            if AdvanceButton::is_pressed(&mut self.inputs) {
                self.button.latch_press();
                self.render(FORCE_INSTRUCTIONS);
                self.clock.delay(FORCE_START_DWELL).await;
                self.button.observe_release(&mut self.inputs);
                self.render(FORCE_CONFIRM);
                self.confirm(step).await;
                break StartPath::Forced;
            }

            self.clock.delay(INPUT_POLL_INTERVAL).await;
        };

        self.record(TelemetryEventKind::StartSatisfied(path));
        Transition::JumpTo(TestStep::ShutdownRequest)
    }

    async fn shutdown_request(&mut self) -> Transition {
        let step = TestStep::ShutdownRequest;
        self.play_intro(step).await;
        self.render(RED_BUTTON_PROMPT);

        let pressed = AdvanceButton::is_pressed(&mut self.inputs);
        if pressed {
            self.button.latch_press();
            self.button
                .wait_for_release(&mut self.inputs, &mut self.clock)
                .await;
            self.record(TelemetryEventKind::OperatorConfirmed(step));
        }

        // Both conditions are checked in the same sample; an active request
        // still needs its own confirmation after a raw press.
        let requested = self.sample(InputId::ShutdownRequest);
        if requested {
            self.render(SHUTDOWN_REQUEST_OK);
            self.confirm(step).await;
        }

        if pressed || requested {
            Transition::JumpTo(TestStep::ShutdownCommand)
        } else {
            Transition::Stay
        }
    }

    /// Runs once per entry: countdown, relay pulse, three confirmations, then
    /// back to the first step with every countdown re-armed.
    async fn shutdown_command(&mut self) -> Transition {
        let step = TestStep::ShutdownCommand;
        let intro = screens::intro_for(step);
        self.render(intro.banner);
        self.countdown(step, intro.countdown).await;

        self.drive_relay(true);
        self.render(CLEAN_SHUTDOWN_PROMPT);
        self.confirm(step).await;

        self.drive_relay(false);
        self.render(SHUTDOWN_COMMAND_OK);
        self.confirm(step).await;

        self.render(INDICATOR_CHECK);
        self.clock.delay(INDICATOR_CHECK_DWELL).await;

        self.render(TESTS_COMPLETE);
        self.confirm(step).await;

        self.flags.reset_all();
        self.passes_completed = self.passes_completed.wrapping_add(1);
        self.record(TelemetryEventKind::PassCompleted(self.passes_completed));
        Transition::JumpTo(TestStep::EmergencyStop)
    }

    async fn play_intro(&mut self, step: TestStep) {
        if self.flags.countdown_done(step) {
            return;
        }

        let intro = screens::intro_for(step);
        self.render(intro.banner);
        self.countdown(step, intro.countdown).await;
        self.flags.mark_countdown_done(step);
    }

    async fn countdown(&mut self, step: TestStep, countdown: Countdown) {
        self.record(TelemetryEventKind::CountdownStarted(step));
        for remaining in (1..=countdown.seconds).rev() {
            self.display.set_cursor(countdown.col, countdown.row);
            self.display.print(&countdown.label(remaining));
            self.clock.delay(COUNTDOWN_TICK).await;
        }
        self.record(TelemetryEventKind::CountdownFinished(step));
    }

    async fn confirm(&mut self, step: TestStep) {
        self.button
            .await_confirmation(&mut self.inputs, &mut self.clock)
            .await;
        self.record(TelemetryEventKind::OperatorConfirmed(step));
    }

    fn render(&mut self, screen: Screen) {
        self.display.clear();
        for line in screen.lines {
            self.display.set_cursor(line.col, line.row);
            self.display.print(line.text);
        }
    }

    /// Reads `input` with its polarity applied, recording level changes.
    fn sample(&mut self, input: InputId) -> bool {
        let active = input_by_id(input).is_active(self.inputs.level(input));
        let slot = &mut self.last_active[input.as_index()];
        let changed = *slot != Some(active);
        *slot = Some(active);

        if changed {
            self.record(TelemetryEventKind::InputChanged { input, active });
        }
        active
    }

    fn drive_relay(&mut self, asserted: bool) {
        self.relay.set_asserted(asserted);
        self.record(if asserted {
            TelemetryEventKind::RelayAsserted
        } else {
            TelemetryEventKind::RelayReleased
        });
    }

    fn record(&mut self, event: TelemetryEventKind) {
        let now = self.clock.now_ms();
        self.telemetry.record(event, now);
    }
}
