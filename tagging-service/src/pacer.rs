use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Enforces a fixed pause between the end of one outbound request and the
/// start of the next.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_finished: Option<Instant>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_finished: None,
        }
    }

    /// Wait until `min_interval` has passed since the previous request
    /// finished. Waits nothing before the first request.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_finished {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                debug!("Pacing classifier call for {:?}", ready_at - Instant::now());
                sleep_until(ready_at).await;
            }
        }
    }

    /// Mark the current request as finished, successful or not.
    pub fn finish(&mut self) {
        self.last_finished = Some(Instant::now());
    }
}
