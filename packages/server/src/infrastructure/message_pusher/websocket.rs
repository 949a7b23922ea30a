//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - Look up session senders in the [`ConnectionRegistry`]
//! - Deliver messages (push_to, broadcast)
//! - Unregister sessions whose channel is closed
//!
//! ## 設計ノート
//!
//! The WebSocket itself is owned by the UI layer (`ui/handler/websocket.rs`),
//! which drains each session's channel into its socket. A closed channel
//! means the socket writer has stopped, i.e. the connection is no longer open.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePushError, MessagePusher};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    registry: Arc<dyn ConnectionRegistry>,
}

impl WebSocketMessagePusher {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let Some(sender) = self.registry.sender(connection_id).await else {
            return Err(MessagePushError::ClientNotFound(connection_id.to_string()));
        };

        if let Err(e) = sender.send(content.to_string()) {
            self.registry.unregister(connection_id).await;
            tracing::warn!(
                "Failed to push message to connection '{}', unregistered it",
                connection_id
            );
            return Err(MessagePushError::PushFailed(e.to_string()));
        }

        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(&self, content: &str) -> usize {
        let targets = self.registry.snapshot().await;
        if targets.is_empty() {
            tracing::warn!("No active WebSocket connections, nothing to broadcast");
            return 0;
        }

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (connection_id, sender) in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match sender.send(content.to_string()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to push message to connection '{}': {}",
                        connection_id,
                        e
                    );
                    failed.push(connection_id);
                }
            }
        }

        for connection_id in failed {
            self.registry.unregister(&connection_id).await;
        }

        tracing::info!("Message broadcast to {} connection(s)", delivered);
        delivered
    }
}
