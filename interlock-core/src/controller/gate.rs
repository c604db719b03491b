//! Shared sampling gate for the polled steps.

use core::time::Duration;

use crate::sequence::timing::SAMPLE_INTERVAL;

/// Throttles how often a polled step re-renders and re-samples its input.
///
/// One gate is shared by every polled step, so leaving a step does not reset
/// the spacing for the next one.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SamplingGate {
    interval_ms: u64,
    last_checked_ms: u64,
}

impl SamplingGate {
    /// Creates a gate that opens every `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_checked_ms: 0,
        }
    }

    /// Returns `true` and restarts the interval when a sample is due at `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_checked_ms) >= self.interval_ms {
            self.last_checked_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Timestamp of the last sample that was let through.
    #[must_use]
    pub const fn last_checked_ms(&self) -> u64 {
        self.last_checked_ms
    }
}

impl Default for SamplingGate {
    fn default() -> Self {
        Self::new(SAMPLE_INTERVAL)
    }
}
