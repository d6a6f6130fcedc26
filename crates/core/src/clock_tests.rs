// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

use super::*;

#[test]
fn system_clock_advances() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}

#[test]
fn fake_clock_is_controllable() {
    let clock = FakeClock::new();
    let start = clock.now();

    clock.advance(Duration::from_secs(30));
    assert_eq!(clock.now() - start, Duration::from_secs(30));

    clock.advance(Duration::from_millis(500));
    assert_eq!(clock.now() - start, Duration::from_millis(30_500));
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_secs(5));
    assert_eq!(other.now(), clock.now());
}
