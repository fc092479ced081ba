// Minimum spacing between upstream requests, shared by every worker.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes request start times so two requests never begin closer than
/// `delay` apart, no matter how many tasks share the throttle.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until the next request may start, then claim that slot.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
