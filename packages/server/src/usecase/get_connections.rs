//! UseCase: 接続一覧の取得（ヘルスチェック・デバッグ用）

use std::sync::Arc;

use crate::domain::{Connection, ConnectionRegistry};

pub struct GetConnectionsUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl GetConnectionsUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Connections ordered by connect time
    pub async fn execute(&self) -> Vec<Connection> {
        self.registry.connections().await
    }

    pub async fn count(&self) -> usize {
        self.registry.count().await
    }
}
