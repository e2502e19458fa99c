//! Match wall-clock budget.

use std::time::{Duration, Instant};

pub struct MatchClock {
    start: Instant,
    limit: Duration,
}

impl MatchClock {
    pub fn start(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Budget consumed; a zero limit is exceeded immediately.
    pub fn exceeded(&self) -> bool {
        self.elapsed() >= self.limit
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }
}
