use super::*;

#[test]
fn fake_clock_advances_deterministically() {
    let clock = FakeClock::at_epoch_ms(1_000);
    assert_eq!(clock.now().timestamp_millis(), 1_000);
    clock.advance(500);
    assert_eq!(clock.now().timestamp_millis(), 1_500);
}

#[test]
fn monotonic_clock_bumps_on_repeated_reading() {
    let fake = FakeClock::at_epoch_ms(5_000);
    let clock = MonotonicClock::new(fake);
    let first = clock.now();
    let second = clock.now();
    assert!(second > first);
    assert_eq!((second - first).num_milliseconds(), 1);
}

#[test]
fn monotonic_clock_passes_through_when_time_advances() {
    let fake = FakeClock::at_epoch_ms(0);
    let clock = MonotonicClock::new(fake);
    let first = clock.now();
    // advancing the inner clock behind the wrapper isn't directly possible
    // since MonotonicClock owns it; verify instead that two back-to-back
    // reads without advancing still strictly increase.
    let second = clock.now();
    assert!(second > first);
}
