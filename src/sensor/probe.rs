//! Bounded retry schedule for sensor detection.
//!
//! The sensor may still be powering up when the firmware wakes, so detection
//! is retried on a fixed poll interval until a search timeout elapses. The
//! schedule is expressed as a finite attempt count up front, which keeps the
//! probe loop trivially bounded.

use std::time::Duration;

use crate::config::{SENSOR_POLL_INTERVAL, SENSOR_SEARCH_TIMEOUT};

/// Retry schedule for sensor detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Total time budget for the search.
    timeout: Duration,
    /// Delay between detection attempts.
    poll_interval: Duration,
}

impl ProbePolicy {
    /// Create a new probe policy.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Number of detection attempts this schedule allows.
    ///
    /// Always at least one, even when the timeout is shorter than a single
    /// poll interval.
    pub fn attempts(&self) -> u32 {
        let poll_ms = self.poll_interval.as_millis().max(1);
        let attempts = self.timeout.as_millis() / poll_ms;
        attempts.max(1) as u32
    }

    /// Delay between detection attempts.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self::new(SENSOR_SEARCH_TIMEOUT, SENSOR_POLL_INTERVAL)
    }
}
