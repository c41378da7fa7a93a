//! Retry, polling and rate limit settings stored in profiles

use crate::timeouts::Timeouts;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for resilience patterns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Retry budgets for API calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Status polling of asynchronous operations
    #[serde(default)]
    pub polling: PollingConfig,

    /// Client-side pacing per API action
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// When disabled every API call is attempted exactly once
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Budget for read/query calls in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Budget for mutating calls in seconds
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Initial backoff in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Timeout of a single HTTP request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            read_timeout_secs: default_read_timeout(),
            write_timeout_secs: default_write_timeout(),
            backoff_ms: default_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between status queries in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Long-running flows may take this many write budgets
    #[serde(default = "default_long_flow_multiplier")]
    pub long_flow_multiplier: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            long_flow_multiplier: default_long_flow_multiplier(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum requests per second for each API action
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl ResilienceConfig {
    /// Convert to runtime budgets
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            read: Duration::from_secs(self.retry.read_timeout_secs),
            write: Duration::from_secs(self.retry.write_timeout_secs),
            poll_interval: Duration::from_millis(self.polling.interval_ms),
            long_flow_multiplier: self.polling.long_flow_multiplier,
            initial_backoff: Duration::from_millis(self.retry.backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            retry_enabled: self.retry.enabled,
        }
    }

    /// Requests per second per action, if pacing is on
    pub fn rate_limit(&self) -> Option<u32> {
        (self.rate_limit.enabled && self.rate_limit.requests_per_second > 0)
            .then_some(self.rate_limit.requests_per_second)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.retry.request_timeout_secs)
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_read_timeout() -> u64 {
    180
}

fn default_write_timeout() -> u64 {
    300
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_long_flow_multiplier() -> u32 {
    10
}

fn default_requests_per_second() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_runtime_defaults() {
        let config = ResilienceConfig::default();
        assert_eq!(config.timeouts(), Timeouts::default());
        assert_eq!(config.rate_limit(), Some(20));
    }

    #[test]
    fn test_partial_toml() {
        let config: ResilienceConfig = toml::from_str(
            r#"
[retry]
write_timeout_secs = 60

[polling]
long_flow_multiplier = 2
"#,
        )
        .unwrap();

        let timeouts = config.timeouts();
        assert_eq!(timeouts.read, Duration::from_secs(180));
        assert_eq!(timeouts.write, Duration::from_secs(60));
        assert_eq!(timeouts.long_flow(), Duration::from_secs(120));
    }

    #[test]
    fn test_disabled_retry_means_single_attempt() {
        let mut config = ResilienceConfig::default();
        config.retry.enabled = false;
        config.rate_limit.enabled = false;

        let timeouts = config.timeouts();
        assert_eq!(timeouts.read_policy().budget, Duration::ZERO);
        assert_eq!(timeouts.write_policy().budget, Duration::ZERO);
        assert_eq!(timeouts.write, Duration::from_secs(300));
        assert_eq!(config.rate_limit(), None);
    }

    #[test]
    fn test_zero_backoff_is_floored() {
        let config: ResilienceConfig = toml::from_str(
            r#"
[retry]
backoff_ms = 0
max_backoff_ms = 0
write_timeout_secs = 9223372036854775807
"#,
        )
        .unwrap();

        let policy = config.timeouts().read_policy();
        assert_eq!(policy.initial_backoff, Duration::from_millis(1));
        assert_eq!(policy.max_backoff, Duration::from_millis(1));
        assert_eq!(config.timeouts().long_flow(), Duration::MAX);
    }
}
