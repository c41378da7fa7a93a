//! Spinner for long-running operations

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tencentcloud_core::{ProgressCallback, ProgressEvent};

/// Spinner shown on stderr while an operation is polled
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn event_message(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Started { handle } => format!("Waiting for {handle}"),
        ProgressEvent::Polling {
            handle,
            status,
            elapsed,
        } => format!("{handle}: {status} ({}s)", elapsed.as_secs()),
        ProgressEvent::Completed { handle, elapsed } => {
            format!("✓ {handle} finished in {}s", elapsed.as_secs())
        }
        ProgressEvent::Failed { handle, error } => format!("✗ {handle}: {error}"),
        ProgressEvent::TimedOut { handle, timeout } => {
            format!("↻ {handle} still running after {}s", timeout.as_secs())
        }
    }
}

/// Progress callback driving `pb`
pub fn spinner_callback(pb: ProgressBar) -> ProgressCallback {
    Arc::new(move |event: ProgressEvent| {
        let message = event_message(&event);
        match event {
            ProgressEvent::Started { .. } | ProgressEvent::Polling { .. } => pb.set_message(message),
            ProgressEvent::Completed { .. }
            | ProgressEvent::Failed { .. }
            | ProgressEvent::TimedOut { .. } => pb.println(message),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_messages() {
        let handle = tencentcloud_core::OperationHandle::Id(42);
        assert_eq!(
            event_message(&ProgressEvent::Polling {
                handle: handle.clone(),
                status: "running".into(),
                elapsed: Duration::from_secs(10),
            }),
            "42: running (10s)"
        );
        assert_eq!(
            event_message(&ProgressEvent::TimedOut {
                handle,
                timeout: Duration::from_secs(60),
            }),
            "↻ 42 still running after 60s"
        );
    }

    #[test]
    fn test_callback_accepts_all_events() {
        let pb = ProgressBar::hidden();
        let callback = spinner_callback(pb.clone());
        let handle = tencentcloud_core::OperationHandle::from("cfs-1");
        callback(ProgressEvent::Started {
            handle: handle.clone(),
        });
        assert_eq!(pb.message(), "Waiting for cfs-1");
        callback(ProgressEvent::Completed {
            handle,
            elapsed: Duration::from_secs(3),
        });
    }
}
