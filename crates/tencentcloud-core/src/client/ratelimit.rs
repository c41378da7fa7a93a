//! Client-side request pacing per API action

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Spaces out calls to the same action so that at most `requests_per_second`
/// are issued per action
#[derive(Debug, Clone)]
pub struct RateLimiter {
    spacing: Duration,
    next_slot: Arc<Mutex<HashMap<String, Instant>>>,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        let spacing = Duration::from_secs(1) / requests_per_second.max(1);
        Self {
            spacing,
            next_slot: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Wait until `action` may be called again
    pub async fn check(&self, action: &str) {
        let wait = {
            let mut slots = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = slots.entry(action.to_string()).or_insert(now);
            let start = (*slot).max(now);
            *slot = start + self.spacing;
            start - now
        };

        if !wait.is_zero() {
            trace!(action, ?wait, "Rate limiting request");
            tokio::time::sleep(wait).await;
        }
    }
}
