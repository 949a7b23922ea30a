//! UseCase: セッション切断処理

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry};

/// セッション切断のユースケース
pub struct DisconnectClientUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectClientUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns `false` when the connection was already gone (e.g. removed
    /// after a failed send)
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        let removed = self.registry.unregister(connection_id).await;
        if removed {
            tracing::info!(
                "Connection {} removed, {} remaining",
                connection_id,
                self.registry.count().await
            );
        }
        removed
    }
}
