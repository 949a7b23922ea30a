//! Long-running background tasks and their shared shutdown signal.

mod heartbeat;
mod janitor;

pub use heartbeat::HeartbeatLoop;
pub use janitor::FeedbackJanitor;

use std::time::Duration;

use tokio::sync::watch;

/// Shortest period a background ticker accepts; tokio rejects a zero period
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Process-wide shutdown notification for background tasks.
///
/// Once triggered it stays triggered, so a listener subscribed afterwards
/// still sees it.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener(self.tx.subscribe())
    }

    pub fn trigger(&self) {
        // Updates the value even when nobody is listening yet
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a [`ShutdownSignal`]
#[derive(Debug)]
pub struct ShutdownListener(watch::Receiver<bool>);

impl ShutdownListener {
    /// Resolves once the signal is triggered (immediately if it already was)
    pub async fn triggered(&mut self) {
        // The sender lives in the signal; its drop also counts as shutdown
        let _ = self.0.wait_for(|triggered| *triggered).await;
    }
}
