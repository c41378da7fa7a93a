//! Runtime time budgets shared by every resource lifecycle

use crate::retry::RetryPolicy;
use std::time::Duration;

/// Time budgets for API calls and polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Budget for retried read/query calls
    pub read: Duration,
    /// Budget for retried create/modify/delete calls, and for short polls
    pub write: Duration,
    /// Delay between status queries
    pub poll_interval: Duration,
    /// `long_flow()` is `write` times this
    pub long_flow_multiplier: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// When false, API calls are attempted once; polling budgets still apply
    pub retry_enabled: bool,
}

impl Timeouts {
    pub const DEFAULT_READ: Duration = Duration::from_secs(3 * 60);
    pub const DEFAULT_WRITE: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_LONG_FLOW_MULTIPLIER: u32 = 10;

    /// Budget for long-running server-side flows
    pub fn long_flow(&self) -> Duration {
        self.write.saturating_mul(self.long_flow_multiplier)
    }

    pub fn read_policy(&self) -> RetryPolicy {
        self.policy(self.read)
    }

    pub fn write_policy(&self) -> RetryPolicy {
        self.policy(self.write)
    }

    fn policy(&self, budget: Duration) -> RetryPolicy {
        if !self.retry_enabled {
            return RetryPolicy::once();
        }
        RetryPolicy::new(budget).with_backoff(self.initial_backoff, self.max_backoff)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Self::DEFAULT_READ,
            write: Self::DEFAULT_WRITE,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            long_flow_multiplier: Self::DEFAULT_LONG_FLOW_MULTIPLIER,
            initial_backoff: RetryPolicy::DEFAULT_INITIAL_BACKOFF,
            max_backoff: RetryPolicy::DEFAULT_MAX_BACKOFF,
            retry_enabled: true,
        }
    }
}
