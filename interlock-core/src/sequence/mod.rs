//! Test step definitions shared by firmware and host targets.
//!
//! The five acceptance steps always run in a fixed cyclic order. Handlers
//! report how they want to leave their step through [`Transition`], which keeps
//! the non-uniform policy (steps 3-5 jump directly instead of using the generic
//! "next" rule) visible in one place.

pub mod timing;

/// Number of variants in [`TestStep`].
pub const STEP_COUNT: usize = 5;

/// One station of the interlock acceptance procedure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TestStep {
    EmergencyStop,
    WallSwitchFeedback,
    StartScanner,
    ShutdownRequest,
    ShutdownCommand,
}

impl TestStep {
    /// Every step in procedure order.
    pub const ALL: [TestStep; STEP_COUNT] = [
        TestStep::EmergencyStop,
        TestStep::WallSwitchFeedback,
        TestStep::StartScanner,
        TestStep::ShutdownRequest,
        TestStep::ShutdownCommand,
    ];

    /// Deterministic index into [`TestStep::ALL`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            TestStep::EmergencyStop => 0,
            TestStep::WallSwitchFeedback => 1,
            TestStep::StartScanner => 2,
            TestStep::ShutdownRequest => 3,
            TestStep::ShutdownCommand => 4,
        }
    }

    /// Attempts to construct a [`TestStep`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < STEP_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Cyclic successor used by the generic advance; wraps to the first step.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::ALL[(self.as_index() + 1) % STEP_COUNT]
    }

    /// One-based station number shown to the technician.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            TestStep::EmergencyStop => 1,
            TestStep::WallSwitchFeedback => 2,
            TestStep::StartScanner => 3,
            TestStep::ShutdownRequest => 4,
            TestStep::ShutdownCommand => 5,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TestStep::EmergencyStop => "emergency-stop",
            TestStep::WallSwitchFeedback => "wall-switch",
            TestStep::StartScanner => "start-scanner",
            TestStep::ShutdownRequest => "shutdown-request",
            TestStep::ShutdownCommand => "shutdown-command",
        }
    }

    /// Returns `true` for steps throttled by the shared sampling gate.
    #[must_use]
    pub const fn uses_sampling_gate(self) -> bool {
        matches!(
            self,
            TestStep::EmergencyStop | TestStep::WallSwitchFeedback | TestStep::ShutdownRequest
        )
    }
}

impl core::fmt::Display for TestStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decision returned by a step handler and consumed by the dispatcher.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Remain in the current step.
    Stay,
    /// Follow the cyclic "next" rule.
    AdvanceGeneric,
    /// Forced jump to a specific step.
    JumpTo(TestStep),
}

impl Transition {
    /// Resolves the step that follows `current`.
    #[must_use]
    pub const fn resolve(self, current: TestStep) -> TestStep {
        match self {
            Transition::Stay => current,
            Transition::AdvanceGeneric => current.next(),
            Transition::JumpTo(target) => target,
        }
    }
}

/// Why a step became current.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryCause {
    Startup,
    Advance,
    Forced,
}

/// Per-step memory that lives for one entry into the step.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StepFlags {
    countdown_done: [bool; STEP_COUNT],
}

impl StepFlags {
    /// Creates a flag set with every countdown pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            countdown_done: [false; STEP_COUNT],
        }
    }

    /// Returns `true` when the step's introductory countdown already ran.
    #[must_use]
    pub const fn countdown_done(&self, step: TestStep) -> bool {
        self.countdown_done[step.as_index()]
    }

    /// Marks the countdown for `step` as played.
    pub fn mark_countdown_done(&mut self, step: TestStep) {
        self.countdown_done[step.as_index()] = true;
    }

    /// Clears the flags owned by `step`.
    pub fn reset(&mut self, step: TestStep) {
        self.countdown_done[step.as_index()] = false;
    }

    /// Clears every step's flags.
    pub fn reset_all(&mut self) {
        self.countdown_done = [false; STEP_COUNT];
    }
}
