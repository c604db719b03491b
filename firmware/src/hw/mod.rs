//! GPIO and timer adapters that implement the `interlock-core` collaborator
//! traits on the STM32G0 bench board.

use core::time::Duration;

use embassy_stm32::gpio::{Input, Output};
use embassy_time::{Instant, Timer};
use interlock_core::controller::{Clock, RelayDriver, SignalInputs};
use interlock_core::signals::{InputId, PinLevel, SHUTDOWN_RELAY};

/// The five monitored inputs, all configured with the internal pull-up.
pub struct BenchInputs<'d> {
    emergency_stop: Input<'d>,
    wall_switch: Input<'d>,
    start_signal: Input<'d>,
    shutdown_request: Input<'d>,
    advance_button: Input<'d>,
}

impl<'d> BenchInputs<'d> {
    pub fn new(
        emergency_stop: Input<'d>,
        wall_switch: Input<'d>,
        start_signal: Input<'d>,
        shutdown_request: Input<'d>,
        advance_button: Input<'d>,
    ) -> Self {
        Self {
            emergency_stop,
            wall_switch,
            start_signal,
            shutdown_request,
            advance_button,
        }
    }

    fn pin(&self, input: InputId) -> &Input<'d> {
        match input {
            InputId::EmergencyStop => &self.emergency_stop,
            InputId::WallSwitch => &self.wall_switch,
            InputId::StartSignal => &self.start_signal,
            InputId::ShutdownRequest => &self.shutdown_request,
            InputId::AdvanceButton => &self.advance_button,
        }
    }
}

impl SignalInputs for BenchInputs<'_> {
    fn level(&mut self, input: InputId) -> PinLevel {
        PinLevel::from_high(self.pin(input).is_high())
    }
}

/// Push-pull output driving the shutdown command relay.
pub struct ShutdownRelay<'d> {
    output: Output<'d>,
}

impl<'d> ShutdownRelay<'d> {
    /// Takes an output already driven to the released level.
    pub fn new(output: Output<'d>) -> Self {
        Self { output }
    }
}

impl RelayDriver for ShutdownRelay<'_> {
    fn set_asserted(&mut self, asserted: bool) {
        let level = if asserted {
            SHUTDOWN_RELAY.polarity.active_level()
        } else {
            SHUTDOWN_RELAY.polarity.inactive_level()
        };
        match level {
            PinLevel::High => self.output.set_high(),
            PinLevel::Low => self.output.set_low(),
        }
    }
}

/// Embassy time driver exposed as the controller clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn delay(&mut self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        Timer::after(embassy_time::Duration::from_micros(micros)).await;
    }
}
