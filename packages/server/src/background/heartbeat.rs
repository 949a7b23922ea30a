//! Heartbeat loop: periodically asks every session to prove it is alive.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use feedback_collector_shared::time::now_rfc3339;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    domain::{ConnectionRegistry, MessagePusher},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{MIN_TICK_INTERVAL, ShutdownListener, ShutdownSignal};

/// Owner of the single heartbeat task of the process.
///
/// The task is started lazily by [`HeartbeatLoop::ensure_running`] when the
/// first session connects, and runs until the shutdown signal fires.
pub struct HeartbeatLoop {
    registry: Arc<dyn ConnectionRegistry>,
    pusher: Arc<dyn MessagePusher>,
    interval: Duration,
    shutdown: Arc<ShutdownSignal>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatLoop {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        pusher: Arc<dyn MessagePusher>,
        interval: Duration,
        shutdown: Arc<ShutdownSignal>,
    ) -> Self {
        Self {
            registry,
            pusher,
            interval: interval.max(MIN_TICK_INTERVAL),
            shutdown,
            handle: Mutex::new(None),
        }
    }

    /// Start the task unless it is already running. Returns `true` if started.
    pub fn ensure_running(&self) -> bool {
        // Subscribe before checking: a trigger in between is still seen by the task
        let shutdown_rx = self.shutdown.subscribe();
        if self.shutdown.is_triggered() {
            return false;
        }

        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.as_ref().is_some_and(|task| !task.is_finished()) {
            return false;
        }

        let task = HeartbeatTask {
            registry: self.registry.clone(),
            pusher: self.pusher.clone(),
            interval: self.interval,
            shutdown_rx,
        };
        *handle = Some(tokio::spawn(task.run()));
        true
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

struct HeartbeatTask {
    registry: Arc<dyn ConnectionRegistry>,
    pusher: Arc<dyn MessagePusher>,
    interval: Duration,
    shutdown_rx: ShutdownListener,
}

impl HeartbeatTask {
    async fn run(mut self) {
        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            "Heartbeat loop started"
        );

        // First beat after one full interval
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.beat().await;
                }
                () = self.shutdown_rx.triggered() => {
                    tracing::info!("Heartbeat loop shutting down");
                    break;
                }
            }
        }
    }

    async fn beat(&self) {
        if self.registry.count().await == 0 {
            return;
        }

        let message = ServerMessage::HeartbeatRequest {
            timestamp: now_rfc3339(),
        };
        match message.encode() {
            Ok(json) => {
                let delivered = self.pusher.broadcast(&json).await;
                tracing::debug!("Heartbeat request sent to {} connection(s)", delivered);
            }
            Err(e) => tracing::error!("Failed to encode heartbeat request: {}", e),
        }
    }
}
