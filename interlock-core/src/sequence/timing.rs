//! Fixed timing for the acceptance procedure.
//!
//! These values are part of the procedure the technicians are trained on and
//! are not configurable at runtime.

use core::time::Duration;

/// Minimum spacing between re-samples of a gated step.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
/// Settle delay after the advance button first reads pressed.
pub const DEBOUNCE_SETTLE: Duration = Duration::from_millis(1_000);
/// Poll period used while waiting on an input level.
pub const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Length of one countdown tick.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
/// Introductory countdown for steps 1-4.
pub const INTRO_COUNTDOWN_SECS: u8 = 10;
/// Countdown before the shutdown relay is driven.
pub const SHUTDOWN_COUNTDOWN_SECS: u8 = 20;
/// Time the technician gets to press the cabinet start button on the forced path.
pub const FORCE_START_DWELL: Duration = Duration::from_secs(10);
/// Time spent on the indicator-lamp check screen.
pub const INDICATOR_CHECK_DWELL: Duration = Duration::from_secs(5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_is_finer_than_sampling_and_debounce() {
        assert!(INPUT_POLL_INTERVAL < SAMPLE_INTERVAL);
        assert!(SAMPLE_INTERVAL < DEBOUNCE_SETTLE);
        assert_eq!(COUNTDOWN_TICK * u32::from(INTRO_COUNTDOWN_SECS), Duration::from_secs(10));
        assert_eq!(
            COUNTDOWN_TICK * u32::from(SHUTDOWN_COUNTDOWN_SECS),
            Duration::from_secs(20)
        );
    }
}
