mod support;

use interlock_core::sequence::{EntryCause, TestStep};
use interlock_core::signals::{InputId, PinLevel};
use interlock_core::telemetry::TelemetryEventKind;

use support::{Bench, count_events, run_until, run_until_step};

#[test]
fn closed_stop_loop_reports_ok_and_press_moves_on() {
    let bench = Bench::new();
    bench.assert_input(InputId::EmergencyStop);
    bench.operator_presses_on("EMERGENCY STOP OK");
    let mut controller = bench.controller();

    run_until_step(&mut controller, TestStep::WallSwitchFeedback);

    let ok_at = bench
        .first_shown_at("EMERGENCY STOP OK")
        .expect("status shown");
    assert!(ok_at >= 10_100, "status must follow the countdown, got {ok_at}");
    assert!(!bench.shown("EMERGENCY STOP NOK"));
    assert_eq!(
        count_events(
            &controller,
            TelemetryEventKind::StepEntered(TestStep::WallSwitchFeedback, EntryCause::Advance)
        ),
        1
    );
}

#[test]
fn open_stop_loop_reports_nok_and_waits() {
    let bench = Bench::new();
    let mut controller = bench.controller();

    run_until(&mut controller, |_| bench.now_ms() >= 30_000);

    assert_eq!(controller.current_step(), TestStep::EmergencyStop);
    assert!(bench.shown("EMERGENCY STOP NOK"));
    assert!(!bench.shown("EMERGENCY STOP OK"));
    assert_eq!(bench.row(2).trim(), "Push next button");
}

#[test]
fn intro_countdown_starts_on_the_first_gated_sample() {
    let bench = Bench::new();
    let mut controller = bench.controller();

    run_until(&mut controller, |_| bench.now_ms() >= 11_000);

    assert_eq!(bench.first_shown_at("First test"), Some(100));
    assert_eq!(bench.first_shown_at("Waiting :10s "), Some(100));
    assert_eq!(bench.first_shown_at("Waiting :1s "), Some(9_100));
    assert_eq!(
        count_events(
            &controller,
            TelemetryEventKind::CountdownStarted(TestStep::EmergencyStop)
        ),
        1
    );
}

#[test]
fn status_follows_the_input_while_waiting() {
    let bench = Bench::new();
    bench.schedule(15_000, InputId::EmergencyStop, PinLevel::Low);
    let mut controller = bench.controller();

    run_until(&mut controller, |_| bench.now_ms() >= 16_000);

    assert!(bench.row(0).contains("EMERGENCY STOP OK"));
    let changes: Vec<bool> = controller
        .telemetry()
        .oldest_first()
        .filter_map(|record| match record.event {
            TelemetryEventKind::InputChanged {
                input: InputId::EmergencyStop,
                active,
            } => Some(active),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![false, true]);
}

#[test]
fn long_press_advances_exactly_one_step() {
    let bench = Bench::new();
    bench.press(10_200, 5_000);
    let mut controller = bench.controller();

    run_until(&mut controller, |_| bench.now_ms() >= 40_000);

    assert_eq!(controller.current_step(), TestStep::WallSwitchFeedback);
    assert!(bench.shown("WALL SWITCH MISSING"));
}
