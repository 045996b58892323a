use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tracing::debug;

/// A repeating wall-clock tick on the running tokio runtime.
///
/// The task is aborted when the handle is dropped, so the clock lives
/// exactly as long as the view that owns it.
#[derive(Debug)]
pub struct Clock {
    handle: JoinHandle<()>,
}

impl Clock {
    /// Calls `tick` immediately and then once every `period`.
    pub fn start<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut(DateTime<Local>) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                tick(Local::now());
            }
        });
        debug!(period_ms = period.as_millis() as u64, "clock started");
        Clock { handle }
    }

    pub fn stop(self) {}
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("clock stopped");
    }
}
