//! Progress tracking and polling for asynchronous cloud operations
//!
//! Many Tencent Cloud mutations return before the work is done: SQL Server
//! hands back a flow id, CFS and EKS flip a lifecycle state. This module
//! provides the single polling loop all of them share, with optional progress
//! callbacks for UI updates.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Identifier of a server-side asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationHandle {
    /// Numeric flow/task id
    Id(i64),
    /// Resource id or string task id
    Name(String),
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationHandle::Id(id) => write!(f, "{id}"),
            OperationHandle::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for OperationHandle {
    fn from(id: i64) -> Self {
        OperationHandle::Id(id)
    }
}

impl From<&str> for OperationHandle {
    fn from(name: &str) -> Self {
        OperationHandle::Name(name.to_string())
    }
}

impl From<String> for OperationHandle {
    fn from(name: String) -> Self {
        OperationHandle::Name(name)
    }
}

/// Status of an asynchronous operation, as mapped from a service's raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Running,
    Success,
    /// Terminal failure with whatever detail the service gave
    Fail(String),
    /// A raw value outside the service's known set
    Unknown(String),
}

impl OperationStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::Running)
    }

    /// Short label used in progress events
    pub fn label(&self) -> &str {
        match self {
            OperationStatus::Running => "running",
            OperationStatus::Success => "success",
            OperationStatus::Fail(_) => "failed",
            OperationStatus::Unknown(raw) => raw,
        }
    }
}

/// Progress events emitted during async operations
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Polling has started
    Started { handle: OperationHandle },
    /// Polling iteration with current status
    Polling {
        handle: OperationHandle,
        status: String,
        elapsed: Duration,
    },
    /// Operation completed successfully
    Completed {
        handle: OperationHandle,
        elapsed: Duration,
    },
    /// Operation failed
    Failed {
        handle: OperationHandle,
        error: String,
    },
    /// Polling gave up before the operation finished
    TimedOut {
        handle: OperationHandle,
        timeout: Duration,
    },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Summary of a successful poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub handle: OperationHandle,
    /// Number of status queries issued, including the final one
    pub queries: u32,
    pub elapsed: Duration,
}

/// Poll an operation until it reaches a terminal status
///
/// * `Running` sleeps `interval` and queries again
/// * `Success` returns a [`PollReport`]
/// * `Fail` returns [`CoreError::TaskFailed`] without querying again
/// * `Unknown` returns [`CoreError::IllegalStatus`] without querying again
/// * a retryable query error is retried, any other query error is returned
///
/// The timeout is checked after every query: once `timeout` has elapsed and
/// the operation is still not terminal, [`CoreError::TaskTimeout`] is returned.
/// The cloud-side operation is left running.
///
/// # Example
///
/// ```rust,ignore
/// use tencentcloud_core::{poll_operation, OperationHandle};
///
/// let report = poll_operation(
///     &OperationHandle::Id(flow_id),
///     timeouts.long_flow(),
///     timeouts.poll_interval,
///     |_| sqlserver.describe_flow_status(flow_id),
///     provider.progress(),
/// )
/// .await?;
/// ```
pub async fn poll_operation<F, Fut>(
    handle: &OperationHandle,
    timeout: Duration,
    interval: Duration,
    mut query: F,
    on_progress: Option<&ProgressCallback>,
) -> Result<PollReport>
where
    F: FnMut(&OperationHandle) -> Fut,
    Fut: Future<Output = Result<OperationStatus>>,
{
    let start = Instant::now();
    let mut queries: u32 = 0;

    emit(
        on_progress,
        ProgressEvent::Started {
            handle: handle.clone(),
        },
    );

    loop {
        queries += 1;
        let status = match query(handle).await {
            Ok(status) => status,
            Err(e) if e.is_retryable() => {
                warn!(%handle, error = %e, "Transient error while polling operation");
                OperationStatus::Running
            }
            Err(e) => {
                emit(
                    on_progress,
                    ProgressEvent::Failed {
                        handle: handle.clone(),
                        error: e.to_string(),
                    },
                );
                return Err(e);
            }
        };
        let elapsed = start.elapsed();

        emit(
            on_progress,
            ProgressEvent::Polling {
                handle: handle.clone(),
                status: status.label().to_string(),
                elapsed,
            },
        );

        match status {
            OperationStatus::Success => {
                info!(%handle, queries, ?elapsed, "Operation completed");
                emit(
                    on_progress,
                    ProgressEvent::Completed {
                        handle: handle.clone(),
                        elapsed,
                    },
                );
                return Ok(PollReport {
                    handle: handle.clone(),
                    queries,
                    elapsed,
                });
            }
            OperationStatus::Fail(reason) => {
                let reason = if reason.is_empty() {
                    "operation reported failure".to_string()
                } else {
                    reason
                };
                emit(
                    on_progress,
                    ProgressEvent::Failed {
                        handle: handle.clone(),
                        error: reason.clone(),
                    },
                );
                return Err(CoreError::TaskFailed {
                    handle: handle.to_string(),
                    reason,
                });
            }
            OperationStatus::Unknown(raw) => {
                let err = CoreError::IllegalStatus {
                    handle: handle.to_string(),
                    status: raw,
                };
                emit(
                    on_progress,
                    ProgressEvent::Failed {
                        handle: handle.clone(),
                        error: err.to_string(),
                    },
                );
                return Err(err);
            }
            OperationStatus::Running => {
                if elapsed >= timeout {
                    warn!(%handle, ?timeout, queries, "Operation timed out");
                    emit(
                        on_progress,
                        ProgressEvent::TimedOut {
                            handle: handle.clone(),
                            timeout,
                        },
                    );
                    return Err(CoreError::TaskTimeout {
                        handle: handle.to_string(),
                        timeout,
                    });
                }
                debug!(%handle, ?elapsed, "Operation still running");
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Poll until a resource no longer exists
///
/// `exists` returning `Ok(true)` counts as running; `Ok(false)` or a
/// not-found error counts as success.
pub async fn wait_until_gone<F, Fut>(
    handle: &OperationHandle,
    timeout: Duration,
    interval: Duration,
    mut exists: F,
    on_progress: Option<&ProgressCallback>,
) -> Result<PollReport>
where
    F: FnMut(&OperationHandle) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    poll_operation(
        handle,
        timeout,
        interval,
        |h| {
            let fut = exists(h);
            async move {
                match fut.await {
                    Ok(true) => Ok(OperationStatus::Running),
                    Ok(false) => Ok(OperationStatus::Success),
                    Err(e) if e.is_not_found() => Ok(OperationStatus::Success),
                    Err(e) => Err(e),
                }
            }
        },
        on_progress,
    )
    .await
}

/// Helper to emit progress events
fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use std::sync::Mutex;

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let cb: ProgressCallback = Arc::new(move |e| sink.lock().unwrap().push(e));
        (cb, events)
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(OperationHandle::Id(42).to_string(), "42");
        assert_eq!(OperationHandle::from("cfs-1").to_string(), "cfs-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_emits_events_in_order() {
        let (cb, events) = recorder();
        let mut remaining = 1;
        let handle = OperationHandle::from("flow-1");
        poll_operation(
            &handle,
            Duration::from_secs(60),
            Duration::from_secs(1),
            |_| {
                let status = if remaining > 0 {
                    remaining -= 1;
                    OperationStatus::Running
                } else {
                    OperationStatus::Success
                };
                async move { Ok(status) }
            },
            Some(&cb),
        )
        .await
        .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], ProgressEvent::Started { .. }));
        assert!(matches!(&events[1], ProgressEvent::Polling { status, .. } if status == "running"));
        assert!(matches!(&events[2], ProgressEvent::Polling { status, .. } if status == "success"));
        assert!(matches!(events[3], ProgressEvent::Completed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_query_error_is_retried() {
        let mut calls = 0;
        let report = poll_operation(
            &OperationHandle::Id(7),
            Duration::from_secs(60),
            Duration::from_secs(1),
            |_| {
                calls += 1;
                let result = if calls == 1 {
                    Err(SdkError::new("InternalError", "", "r").into())
                } else {
                    Ok(OperationStatus::Success)
                };
                async move { result }
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.queries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_query_error_aborts() {
        let (cb, events) = recorder();
        let mut calls = 0;
        let err = poll_operation(
            &OperationHandle::Id(7),
            Duration::from_secs(60),
            Duration::from_secs(1),
            |_| {
                calls += 1;
                async { Err(SdkError::new("AuthFailure", "", "r").into()) }
            },
            Some(&cb),
        )
        .await
        .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(calls, 1);
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(ProgressEvent::Failed { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_gone() {
        let mut calls = 0;
        let report = wait_until_gone(
            &OperationHandle::from("cls-1"),
            Duration::from_secs(60),
            Duration::from_secs(1),
            |_| {
                calls += 1;
                let result = if calls < 3 {
                    Ok(true)
                } else {
                    Err(SdkError::new("ResourceNotFound.ClusterNotFound", "", "r").into())
                };
                async move { result }
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.queries, 3);
        assert_eq!(report.elapsed, Duration::from_secs(2));
    }
}
