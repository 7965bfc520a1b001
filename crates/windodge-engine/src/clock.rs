//! Time source used for animation pacing, cooldowns and retry delays.

use std::{
    thread,
    time::{Duration, Instant},
};

/// Monotonic clock with a blocking sleep.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
    /// Block the calling thread for `d`.
    fn sleep(&self, d: Duration);
}

/// Wall-clock implementation backed by `std`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}
