//! Periodic purge of feedback entries older than a TTL.

use std::{sync::Arc, time::Duration};

use crate::domain::FeedbackRepository;

use super::{MIN_TICK_INTERVAL, ShutdownListener};

pub struct FeedbackJanitor {
    repository: Arc<dyn FeedbackRepository>,
    ttl: Duration,
    check_interval: Duration,
    shutdown_rx: ShutdownListener,
}

impl FeedbackJanitor {
    pub fn new(
        repository: Arc<dyn FeedbackRepository>,
        ttl: Duration,
        check_interval: Duration,
        shutdown_rx: ShutdownListener,
    ) -> Self {
        Self {
            repository,
            ttl,
            check_interval: check_interval.max(MIN_TICK_INTERVAL),
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            ttl_secs = self.ttl.as_secs(),
            check_interval_secs = self.check_interval.as_secs(),
            "Feedback janitor started"
        );

        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep().await;
                }
                () = self.shutdown_rx.triggered() => {
                    tracing::info!("Feedback janitor shutting down");
                    break;
                }
            }
        }
    }

    pub async fn sweep(&self) -> usize {
        let purged = self.repository.purge_expired(self.ttl).await;
        if purged > 0 {
            tracing::info!("Purged {} expired feedback request(s)", purged);
        }
        purged
    }
}
