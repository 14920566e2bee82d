use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Retry with a fixed interval, up to a maximum number of attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// The number of attempts, we always try at least once.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// The delay to wait after a failed attempt (starting with `1`), or [`None`] if the budget
    /// is used up.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.attempts()).then_some(self.interval)
    }
}
