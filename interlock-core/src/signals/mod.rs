//! Interlock signal catalog shared by firmware and host targets.
//!
//! Every monitored input and the shutdown relay are described here once, with
//! the polarity they are wired for. The controller never compares raw levels
//! directly; it asks the catalog whether a level means "active" for a given
//! line, so an active-high input cannot be mistaken for an active-low one.

/// Raw electrical level read from or written to a pin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinLevel {
    Low,
    High,
}

impl PinLevel {
    /// Converts a boolean "pin is high" reading into a [`PinLevel`].
    #[must_use]
    pub const fn from_high(is_high: bool) -> Self {
        if is_high {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

/// Signal polarity as wired on the tester harness.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    /// Returns `true` when `level` represents the asserted state.
    #[must_use]
    pub const fn is_active(self, level: PinLevel) -> bool {
        matches!(
            (self, level),
            (Polarity::ActiveLow, PinLevel::Low) | (Polarity::ActiveHigh, PinLevel::High)
        )
    }

    /// Level that asserts a line with this polarity.
    #[must_use]
    pub const fn active_level(self) -> PinLevel {
        match self {
            Polarity::ActiveLow => PinLevel::Low,
            Polarity::ActiveHigh => PinLevel::High,
        }
    }

    /// Level that leaves a line with this polarity released.
    #[must_use]
    pub const fn inactive_level(self) -> PinLevel {
        match self {
            Polarity::ActiveLow => PinLevel::High,
            Polarity::ActiveHigh => PinLevel::Low,
        }
    }
}

/// Identifier for every digital input read by the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputId {
    EmergencyStop,
    WallSwitch,
    StartSignal,
    ShutdownRequest,
    AdvanceButton,
}

/// Number of entries in [`ALL_INPUTS`].
pub const INPUT_COUNT: usize = 5;

impl InputId {
    /// Deterministic index for lookups into [`ALL_INPUTS`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            InputId::EmergencyStop => 0,
            InputId::WallSwitch => 1,
            InputId::StartSignal => 2,
            InputId::ShutdownRequest => 3,
            InputId::AdvanceButton => 4,
        }
    }

    /// Attempts to construct an [`InputId`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(InputId::EmergencyStop),
            1 => Some(InputId::WallSwitch),
            2 => Some(InputId::StartSignal),
            3 => Some(InputId::ShutdownRequest),
            4 => Some(InputId::AdvanceButton),
            _ => None,
        }
    }
}

/// Metadata describing how an input is routed to the MCU.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InputLine {
    pub id: InputId,
    pub name: &'static str,
    pub mcu_pin: &'static str,
    pub polarity: Polarity,
    /// What the asserted level means on the scanner side.
    pub meaning: &'static str,
}

impl InputLine {
    pub const fn new(
        id: InputId,
        name: &'static str,
        mcu_pin: &'static str,
        polarity: Polarity,
        meaning: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            mcu_pin,
            polarity,
            meaning,
        }
    }

    /// Returns `true` when `level` asserts this input.
    #[must_use]
    pub const fn is_active(&self, level: PinLevel) -> bool {
        self.polarity.is_active(level)
    }
}

/// Compile-time catalog of every input. All inputs use the MCU pull-up.
pub const ALL_INPUTS: [InputLine; INPUT_COUNT] = [
    InputLine::new(
        InputId::EmergencyStop,
        "EMERGENCY",
        "PA0",
        Polarity::ActiveLow,
        "stop loop closed",
    ),
    InputLine::new(
        InputId::WallSwitch,
        "WALL_SWITCH",
        "PA1",
        Polarity::ActiveLow,
        "24V supply present",
    ),
    InputLine::new(
        InputId::StartSignal,
        "START",
        "PA6",
        Polarity::ActiveLow,
        "scanner start detected",
    ),
    InputLine::new(
        InputId::ShutdownRequest,
        "SHUTDOWN_REQ",
        "PA7",
        Polarity::ActiveHigh,
        "scanner requests shutdown",
    ),
    InputLine::new(
        InputId::AdvanceButton,
        "NEXT",
        "PB2",
        Polarity::ActiveLow,
        "operator acknowledges",
    ),
];

/// Retrieve input metadata by identifier.
#[must_use]
pub const fn input_by_id(id: InputId) -> InputLine {
    ALL_INPUTS[id.as_index()]
}

/// Metadata for the single relay output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutputLine {
    pub name: &'static str,
    pub mcu_pin: &'static str,
    pub polarity: Polarity,
}

/// Shutdown command relay; driven low at boot.
pub const SHUTDOWN_RELAY: OutputLine = OutputLine {
    name: "SHUTDOWN_CMD",
    mcu_pin: "PB3",
    polarity: Polarity::ActiveHigh,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_id() {
        for (index, line) in ALL_INPUTS.iter().enumerate() {
            assert_eq!(line.id.as_index(), index);
            assert_eq!(InputId::from_index(index), Some(line.id));
        }
        assert_eq!(InputId::from_index(INPUT_COUNT), None);
    }

    #[test]
    fn shutdown_request_is_the_only_active_high_input() {
        let emergency = input_by_id(InputId::EmergencyStop);
        assert!(emergency.is_active(PinLevel::Low));
        assert!(!emergency.is_active(PinLevel::High));

        let request = input_by_id(InputId::ShutdownRequest);
        assert!(request.is_active(PinLevel::High));
        assert!(!request.is_active(PinLevel::Low));

        let active_high: usize = ALL_INPUTS
            .iter()
            .filter(|line| line.polarity == Polarity::ActiveHigh)
            .count();
        assert_eq!(active_high, 1);
    }

    #[test]
    fn relay_asserts_high() {
        assert_eq!(SHUTDOWN_RELAY.polarity.active_level(), PinLevel::High);
        assert_eq!(SHUTDOWN_RELAY.polarity.inactive_level(), PinLevel::Low);
        assert_eq!(SHUTDOWN_RELAY.mcu_pin, "PB3");
    }
}
