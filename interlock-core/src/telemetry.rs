//! Telemetry event catalog and ring buffer shared by firmware and host targets.
//!
//! The controller records what happened (step entries, countdowns, input
//! changes, confirmations, relay drive) into a fixed-size history. Nothing is
//! persisted; firmware drains the ring into defmt logs and the emulator into
//! its log pane.

use core::fmt;

use heapless::HistoryBuf;

use crate::sequence::{EntryCause, TestStep};
use crate::signals::InputId;

/// Identifier assigned to each telemetry record.
pub type EventId = u32;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 128;

/// How the start-scanner step was satisfied.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartPath {
    /// The scanner's own start signal was seen and acknowledged.
    SignalReceived,
    /// The technician forced the start from the cabinet and acknowledged it.
    Forced,
}

/// Discriminated telemetry events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryEventKind {
    StepEntered(TestStep, EntryCause),
    CountdownStarted(TestStep),
    CountdownFinished(TestStep),
    InputChanged { input: InputId, active: bool },
    OperatorConfirmed(TestStep),
    StartSatisfied(StartPath),
    RelayAsserted,
    RelayReleased,
    PassCompleted(u32),
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::StepEntered(step, cause) => {
                write!(f, "step-entered {step} ({cause:?})")
            }
            TelemetryEventKind::CountdownStarted(step) => write!(f, "countdown-started {step}"),
            TelemetryEventKind::CountdownFinished(step) => write!(f, "countdown-finished {step}"),
            TelemetryEventKind::InputChanged { input, active } => {
                let state = if *active { "active" } else { "inactive" };
                write!(f, "input {input:?} {state}")
            }
            TelemetryEventKind::OperatorConfirmed(step) => write!(f, "confirmed {step}"),
            TelemetryEventKind::StartSatisfied(path) => write!(f, "start-satisfied {path:?}"),
            TelemetryEventKind::RelayAsserted => f.write_str("relay-asserted"),
            TelemetryEventKind::RelayReleased => f.write_str("relay-released"),
            TelemetryEventKind::PassCompleted(count) => write!(f, "pass-completed #{count}"),
        }
    }
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryRecord {
    pub id: EventId,
    pub timestamp_ms: u64,
    pub event: TelemetryEventKind,
}

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> {
    ring: HistoryBuf<TelemetryRecord, CAPACITY>,
    next_event_id: EventId,
}

impl<const CAPACITY: usize> TelemetryRecorder<CAPACITY> {
    /// Creates a new telemetry recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Records an event and returns its identifier.
    pub fn record(&mut self, event: TelemetryEventKind, timestamp_ms: u64) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            timestamp_ms,
            event,
        });

        id
    }

    /// Returns an iterator over the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        self.ring.oldest_ordered()
    }

    /// Records newer than `last`, oldest first. `None` yields everything retained.
    pub fn records_after(
        &self,
        last: Option<EventId>,
    ) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        self.oldest_first()
            .filter(move |record| last.is_none_or(|seen| record.id > seen))
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl<const CAPACITY: usize> Default for TelemetryRecorder<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
