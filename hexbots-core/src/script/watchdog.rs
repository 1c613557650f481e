//! Loop watchdog

use std::time::{Duration, Instant};

/// Deadline armed when a loop starts.
///
/// Loops poll [`Watchdog::expired`] once per iteration; a body that never
/// returns is not interrupted.
#[derive(Clone, Copy, Debug)]
pub struct Watchdog {
    deadline: Instant,
}

impl Watchdog {
    pub fn arm(limit: Duration) -> Self {
        Self {
            deadline: Instant::now() + limit,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
