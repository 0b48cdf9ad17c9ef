//! Tests for utility functions

use std::time::Duration;

use order_admission::util::{now_ms, Clock, ManualClock, SystemClock};

#[test]
fn test_system_clock_tracks_wall_time() {
    let before = now_ms();
    let observed = SystemClock.now_ms();
    assert!(observed >= before);
}

#[test]
fn test_manual_clock_sleep_advances_time() {
    let clock = ManualClock::new(10_000);
    clock.sleep(Duration::from_millis(2_000));
    assert_eq!(clock.now_ms(), 12_000);
    clock.advance(Duration::from_secs(1));
    assert_eq!(clock.now_ms(), 13_000);
    clock.set(0);
    assert_eq!(clock.now_ms(), 0);
}

#[test]
fn test_init_tracing_is_idempotent() {
    order_admission::util::init_tracing();
    order_admission::util::init_tracing();
}
