//! Bounded-duration retry of a single cloud operation
//!
//! Every API call made by a resource lifecycle goes through [`retry`]. The
//! operation reports its outcome as an [`Attempt`], which makes "try again"
//! an explicit value instead of a special error. Retryable failures are
//! repeated with exponential backoff until the wall-clock budget is spent;
//! anything else is returned on the spot.

use crate::error::{CoreError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Outcome of one invocation of a retried operation
#[derive(Debug)]
pub enum Attempt<T> {
    /// The operation succeeded
    Done(T),
    /// The operation failed transiently and may be repeated
    Retry(CoreError),
    /// The operation failed and must not be repeated
    Fail(CoreError),
}

impl<T> Attempt<T> {
    /// Classify a result using [`CoreError::is_retryable`]
    pub fn from_result(result: Result<T>) -> Self {
        Self::from_result_with(result, &[])
    }

    /// Classify a result, additionally treating `codes` as retryable
    ///
    /// Call sites use this to wait out eventual consistency, e.g. a freshly
    /// created instance that still answers `ResourceNotFound`.
    pub fn from_result_with(result: Result<T>, codes: &[&str]) -> Self {
        match result {
            Ok(value) => Attempt::Done(value),
            Err(e) if e.is_retryable() || e.has_code(codes) => Attempt::Retry(e),
            Err(e) => Attempt::Fail(e),
        }
    }
}

/// How long and how often to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wall-clock budget for all attempts together
    pub budget: Duration,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
    /// Upper bound for the delay between attempts
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
    pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);
    /// Floor for the first delay
    pub const MIN_BACKOFF: Duration = Duration::from_millis(1);

    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            initial_backoff: Self::DEFAULT_INITIAL_BACKOFF,
            max_backoff: Self::DEFAULT_MAX_BACKOFF,
        }
    }

    /// A policy that makes exactly one attempt
    pub fn once() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial.max(Self::MIN_BACKOFF);
        self.max_backoff = max.max(self.initial_backoff);
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(180))
    }
}

/// Run `op` until it is done, fails fatally, or the budget is spent
///
/// # Example
///
/// ```rust,ignore
/// use tencentcloud_core::{retry, Attempt, RetryPolicy};
///
/// let fs = retry(RetryPolicy::new(timeouts.read), || async {
///     Attempt::from_result_with(cfs.describe_file_system(&id).await, &["ResourceNotFound"])
/// })
/// .await?;
/// ```
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let start = Instant::now();
    let mut backoff = policy.initial_backoff;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let err = match op().await {
            Attempt::Done(value) => {
                if attempts > 1 {
                    debug!(attempts, elapsed = ?start.elapsed(), "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Attempt::Fail(e) => return Err(e),
            Attempt::Retry(e) => e,
        };

        let elapsed = start.elapsed();
        if elapsed >= policy.budget {
            warn!(attempts, budget = ?policy.budget, error = %err, "Retry budget exhausted");
            return Err(CoreError::RetryExhausted {
                budget: policy.budget,
                last: Box::new(err),
            });
        }

        let delay = backoff.min(policy.budget - elapsed);
        debug!(attempt = attempts, delay = ?delay, error = %err, "Retrying operation");
        tokio::time::sleep(delay).await;
        backoff = backoff.saturating_mul(2).min(policy.max_backoff);
    }
}

/// Retry an operation returning a plain [`Result`], classified by [`Attempt::from_result`]
pub async fn retry_call<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry(policy, || {
        let fut = op();
        async move { Attempt::from_result(fut.await) }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn sdk(code: &str) -> CoreError {
        SdkError::new(code, "test", "req").into()
    }

    #[test]
    fn test_classification() {
        assert!(matches!(
            Attempt::<()>::from_result(Err(sdk("InternalError"))),
            Attempt::Retry(_)
        ));
        assert!(matches!(
            Attempt::<()>::from_result(Err(sdk("ResourceNotFound"))),
            Attempt::Fail(_)
        ));
        assert!(matches!(
            Attempt::<()>::from_result_with(Err(sdk("ResourceNotFound")), &["ResourceNotFound"]),
            Attempt::Retry(_)
        ));
        assert!(matches!(Attempt::from_result(Ok(1)), Attempt::Done(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_errors() {
        let calls = AtomicU32::new(0);
        let result = retry_call(RetryPolicy::new(Duration::from_secs(60)), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(sdk("RequestLimitExceeded"))
            } else {
                Ok("ok")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_short_circuits() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result: Result<()> = retry_call(RetryPolicy::new(Duration::from_secs(60)), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(sdk("InvalidParameterValue"))
        })
        .await;

        assert!(result.unwrap_err().is_bad_request());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_is_respected() {
        let budget = Duration::from_secs(30);
        let start = Instant::now();
        let result: Result<()> = retry_call(RetryPolicy::new(budget), || async {
            Err(sdk("ResourceBusy"))
        })
        .await;

        let elapsed = start.elapsed();
        assert!(elapsed >= budget);
        assert!(elapsed < budget + Duration::from_secs(1));
        match result.unwrap_err() {
            CoreError::RetryExhausted { budget: b, last } => {
                assert_eq!(b, budget);
                assert!(last.has_code(&["ResourceBusy"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_is_single_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_call(RetryPolicy::once(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(sdk("InternalError"))
        })
        .await;

        assert!(result.unwrap_err().is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_capped() {
        let policy = RetryPolicy::new(Duration::from_secs(100))
            .with_backoff(Duration::from_secs(1), Duration::from_secs(4));
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let _ = retry_call(policy, || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 5 {
                Err(sdk("InternalError"))
            } else {
                Ok(())
            }
        })
        .await;

        // 1 + 2 + 4 + 4 + 4
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_backoff_still_waits_between_attempts() {
        let policy =
            RetryPolicy::new(Duration::from_secs(1)).with_backoff(Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.initial_backoff, RetryPolicy::MIN_BACKOFF);
        assert_eq!(policy.max_backoff, RetryPolicy::MIN_BACKOFF);

        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result: Result<()> = retry_call(policy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(sdk("ResourceBusy"))
        })
        .await;

        assert!(matches!(result.unwrap_err(), CoreError::RetryExhausted { .. }));
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(calls.load(Ordering::SeqCst) <= 1001);
    }
}
