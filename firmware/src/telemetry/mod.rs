//! Mirrors controller telemetry to defmt / stdout.
//!
//! The controller keeps its own ring of records. After every poll the
//! sequence task hands that ring to a [`TelemetryLog`], which emits only the
//! records it has not logged yet.

use interlock_core::telemetry::{EventId, TelemetryRecord, TelemetryRecorder};

/// Remembers the last record already logged.
#[derive(Debug, Default)]
pub struct TelemetryLog {
    last_logged: Option<EventId>,
}

impl TelemetryLog {
    pub const fn new() -> Self {
        Self { last_logged: None }
    }

    /// Logs every record newer than the previous drain and returns how many
    /// were emitted.
    pub fn drain<const CAPACITY: usize>(&mut self, recorder: &TelemetryRecorder<CAPACITY>) -> usize {
        let mut emitted = 0;
        for record in recorder.records_after(self.last_logged) {
            emit_log(record);
            self.last_logged = Some(record.id);
            emitted += 1;
        }
        emitted
    }

    pub const fn last_logged(&self) -> Option<EventId> {
        self.last_logged
    }
}

#[cfg(target_os = "none")]
fn emit_log(record: &TelemetryRecord) {
    defmt::info!(
        "telemetry #{} t={}ms {}",
        record.id,
        record.timestamp_ms,
        record.event
    );
}

#[cfg(not(target_os = "none"))]
fn emit_log(record: &TelemetryRecord) {
    println!(
        "telemetry #{} t={}ms {}",
        record.id, record.timestamp_ms, record.event
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlock_core::sequence::{EntryCause, TestStep};
    use interlock_core::telemetry::TelemetryEventKind;

    #[test]
    fn drain_only_emits_new_records() {
        let mut recorder: TelemetryRecorder = TelemetryRecorder::new();
        let mut log = TelemetryLog::new();

        recorder.record(
            TelemetryEventKind::StepEntered(TestStep::EmergencyStop, EntryCause::Startup),
            0,
        );
        recorder.record(
            TelemetryEventKind::CountdownStarted(TestStep::EmergencyStop),
            100,
        );
        assert_eq!(log.drain(&recorder), 2);
        assert_eq!(log.drain(&recorder), 0);

        recorder.record(TelemetryEventKind::RelayAsserted, 200);
        assert_eq!(log.drain(&recorder), 1);
        assert_eq!(log.last_logged(), Some(2));
    }
}
