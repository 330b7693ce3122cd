//! Traffic light state machine tests

use std::time::Duration;

use smart_signal::simulation::{Category, EventLog, Phase, SimSignal};

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[test]
fn test_signal_starts_red_without_priority() {
    let signal = SimSignal::new();
    assert_eq!(signal.phase, Phase::Red);
    assert!(!signal.priority_active);
    assert_eq!(signal.priority_label(), "none");
    assert_eq!(signal.cycle_count, 0);
    assert_eq!(signal.vehicles_passed_total, 0);
}

#[test]
fn test_remaining_counts_down_and_saturates() {
    let mut log = EventLog::new();
    let mut signal = SimSignal::new();
    signal.set_phase(Phase::Green, secs(10), secs(100), &mut log);

    assert_eq!(signal.remaining(secs(100)), secs(10));
    assert_eq!(signal.remaining(secs(104)), secs(6));
    assert!(!signal.is_phase_done(secs(109)));
    assert_eq!(signal.remaining(secs(110)), Duration::ZERO);
    assert_eq!(signal.remaining(secs(500)), Duration::ZERO);
    assert!(signal.is_phase_done(secs(110)));
}

#[test]
fn test_remaining_is_idempotent() {
    let mut log = EventLog::new();
    let mut signal = SimSignal::new();
    signal.set_phase(Phase::Yellow, secs(4), secs(1), &mut log);

    let now = Duration::from_millis(2500);
    assert_eq!(signal.remaining(now), signal.remaining(now));
    assert_eq!(signal.remaining_secs(now), signal.remaining_secs(now));
}

#[test]
fn test_set_phase_logs_transition() {
    let mut log = EventLog::new();
    let mut signal = SimSignal::new();
    signal.set_phase(Phase::Green, secs(12), Duration::ZERO, &mut log);

    assert_eq!(signal.phase, Phase::Green);
    assert!(log.contains("[INFO] Light switched to GREEN for 12 seconds"));
}

#[test]
fn test_priority_window_expires_strictly_after_deadline() {
    let mut log = EventLog::new();
    let mut signal = SimSignal::new();
    signal.activate_priority(Category::Police, secs(10), secs(5), &mut log);

    assert!(signal.priority_active);
    assert_eq!(signal.priority_label(), "police");
    assert!(log.contains("[PRIORITY] Priority activated: POLICE for 10 seconds"));

    signal.tick_priority(secs(15), &mut log);
    assert!(signal.priority_active, "window is still open exactly at the deadline");

    signal.tick_priority(Duration::from_millis(15_001), &mut log);
    assert!(!signal.priority_active);
    assert_eq!(signal.priority_category, None);
    assert!(log.contains("[PRIORITY] Priority mode ended"));
}

#[test]
fn test_new_priority_request_overwrites_window() {
    let mut log = EventLog::new();
    let mut signal = SimSignal::new();
    signal.activate_priority(Category::Fire, secs(20), secs(0), &mut log);
    signal.activate_priority(Category::Emergency, secs(3), secs(1), &mut log);

    assert_eq!(signal.priority_category, Some(Category::Emergency));
    assert_eq!(signal.priority_expires_at, secs(4));

    signal.tick_priority(secs(5), &mut log);
    assert!(!signal.priority_active, "the earlier, longer window must not linger");
}

#[test]
fn test_tick_priority_without_window_is_quiet() {
    let mut log = EventLog::new();
    let mut signal = SimSignal::new();
    signal.tick_priority(secs(1000), &mut log);

    assert!(!signal.priority_active);
    assert!(log.is_empty());
}

#[test]
fn test_counters_are_monotonic() {
    let mut signal = SimSignal::new();
    for _ in 0..3 {
        signal.on_vehicle_passed();
    }
    signal.complete_cycle();

    assert_eq!(signal.vehicles_passed_total, 3);
    assert_eq!(signal.cycle_count, 1);
}
