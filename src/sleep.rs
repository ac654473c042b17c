//! Deep sleep scheduling.
//!
//! The device targets a fixed wake-to-wake interval: time spent awake in a
//! cycle is deducted from the sleep that follows it. A cycle that overruns
//! the interval (slow Wi-Fi, sensor search timeout) still sleeps a minimum
//! amount so the device never busy-loops through back-to-back wakes.

use std::time::Duration;

/// Deep sleep duration for a cycle that has been awake for `awake`.
///
/// Saturates at `minimum` when the cycle overran `interval`.
pub fn remaining_sleep(interval: Duration, awake: Duration, minimum: Duration) -> Duration {
    interval.saturating_sub(awake).max(minimum)
}

/// Enter deep sleep for `duration`. Does not return; the next wake starts
/// over from the reset vector.
#[cfg(feature = "esp32")]
pub fn enter(duration: Duration) -> ! {
    log::info!("Entering deep sleep for {:?}", duration);
    unsafe { esp_idf_svc::sys::esp_deep_sleep(duration.as_micros() as u64) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(600);
    const MINIMUM: Duration = Duration::from_secs(10);

    #[test]
    fn test_fast_cycle_sleeps_almost_full_interval() {
        let sleep = remaining_sleep(INTERVAL, Duration::from_secs(12), MINIMUM);
        assert_eq!(sleep, Duration::from_secs(588));
    }

    #[test]
    fn test_zero_awake_time_sleeps_full_interval() {
        let sleep = remaining_sleep(INTERVAL, Duration::ZERO, MINIMUM);
        assert_eq!(sleep, INTERVAL);
    }

    #[test]
    fn test_overrun_cycle_sleeps_minimum() {
        let sleep = remaining_sleep(INTERVAL, Duration::from_secs(700), MINIMUM);
        assert_eq!(sleep, MINIMUM);
    }

    #[test]
    fn test_exact_overrun_sleeps_minimum() {
        let sleep = remaining_sleep(INTERVAL, INTERVAL, MINIMUM);
        assert_eq!(sleep, MINIMUM);
    }

    #[test]
    fn test_remainder_below_minimum_is_floored() {
        let sleep = remaining_sleep(INTERVAL, Duration::from_secs(595), MINIMUM);
        assert_eq!(sleep, MINIMUM);
    }
}
