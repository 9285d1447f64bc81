//! Bounded polling for asynchronous page content
//!
//! Rendering happens out of band, so callers poll a condition at a fixed
//! interval until it holds or a deadline passes.

use std::time::Duration;

use tokio::time::{Instant, sleep};

/// How long to keep polling and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl SettlePolicy {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn start(&self) -> Deadline {
        Deadline {
            at: Instant::now() + self.timeout,
            interval: self.interval,
        }
    }
}

/// A running poll window
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    interval: Duration,
}

impl Deadline {
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Sleep until the next poll. Returns `false` once the deadline has
    /// passed, in which case the caller should stop polling.
    pub async fn tick(&self) -> bool {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return false;
        }
        sleep(self.interval.min(remaining)).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tick_stops_at_deadline() {
        let policy = SettlePolicy::new(Duration::from_millis(250), Duration::from_millis(100));
        let deadline = policy.start();
        let started = Instant::now();

        let mut ticks = 0;
        while deadline.tick().await {
            ticks += 1;
        }

        // 100 + 100 + 50 (capped to what remains)
        assert_eq!(ticks, 3);
        assert_eq!(started.elapsed(), Duration::from_millis(250));
        assert!(deadline.remaining().is_zero());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_never_sleeps() {
        let deadline = SettlePolicy::new(Duration::ZERO, Duration::from_millis(100)).start();
        assert!(!deadline.tick().await);
    }
}
