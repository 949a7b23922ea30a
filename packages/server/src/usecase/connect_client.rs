//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - レジストリ登録、ハートビート起動、connection_established の送信
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規セッションの接続
//! - 異常系：登録直後にチャンネルが閉じている（挨拶の送信失敗）

use std::sync::Arc;

use feedback_collector_shared::time::{millis_to_rfc3339, now_millis};

use crate::{
    background::HeartbeatLoop,
    domain::{ConnectionId, ConnectionRegistry, MessagePusher, PusherChannel, Timestamp},
    infrastructure::dto::websocket::ServerMessage,
};

use super::error::ConnectError;

const GREETING: &str = "WebSocket connection established";

/// セッション接続のユースケース
pub struct ConnectClientUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    heartbeat: Arc<HeartbeatLoop>,
}

impl ConnectClientUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        heartbeat: Arc<HeartbeatLoop>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            heartbeat,
        }
    }

    /// セッション接続を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Timestamp)` - 接続時刻
    /// * `Err(ConnectError)` - 挨拶メッセージを送れなかった（登録は解除済み）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
        client_info: Option<serde_json::Value>,
    ) -> Result<Timestamp, ConnectError> {
        let now = now_millis();
        let connected_at = Timestamp::new(now);

        // 1. Registry に登録
        self.registry
            .register(connection_id, sender, client_info, connected_at)
            .await;

        // 2. ハートビートが止まっていれば起動
        if self.heartbeat.ensure_running() {
            tracing::debug!("Heartbeat loop started by connection {}", connection_id);
        }

        // 3. 接続確立を通知
        let greeting = ServerMessage::ConnectionEstablished {
            connection_id: connection_id.to_string(),
            timestamp: millis_to_rfc3339(now),
            message: GREETING.to_string(),
        };
        let json = greeting
            .encode()
            .map_err(|e| ConnectError::Encode(e.to_string()))?;
        self.message_pusher.push_to(&connection_id, &json).await?;

        Ok(connected_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        background::ShutdownSignal,
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryConnectionRegistry,
        },
    };
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn create_usecase() -> (
        ConnectClientUseCase,
        Arc<InMemoryConnectionRegistry>,
        Arc<HeartbeatLoop>,
        Arc<ShutdownSignal>,
    ) {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
        let shutdown = Arc::new(ShutdownSignal::new());
        let heartbeat = Arc::new(HeartbeatLoop::new(
            registry.clone(),
            pusher.clone(),
            Duration::from_secs(30),
            shutdown.clone(),
        ));
        let usecase = ConnectClientUseCase::new(registry.clone(), pusher, heartbeat.clone());
        (usecase, registry, heartbeat, shutdown)
    }

    #[tokio::test]
    async fn test_connect_registers_and_greets() {
        // テスト項目: 接続するとレジストリに登録され、connection_established が届く
        // given (前提条件):
        let (usecase, registry, heartbeat, shutdown) = create_usecase();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();

        // when (操作):
        let result = usecase
            .execute(
                connection_id,
                tx,
                Some(serde_json::json!({"agent": "test"})),
            )
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(registry.count().await, 1);
        assert!(heartbeat.is_running());

        let greeting: ServerMessage = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        match greeting {
            ServerMessage::ConnectionEstablished {
                connection_id: id,
                message,
                ..
            } => {
                assert_eq!(id, connection_id.to_string());
                assert_eq!(message, GREETING);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        shutdown.trigger();
    }

    #[tokio::test]
    async fn test_connect_with_closed_channel_fails_and_unregisters() {
        // テスト項目: 受信側が閉じていると挨拶の送信に失敗し、登録も解除される
        // given (前提条件):
        let (usecase, registry, _heartbeat, shutdown) = create_usecase();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        // when (操作):
        let result = usecase.execute(ConnectionId::generate(), tx, None).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ConnectError::Greeting(_))));
        assert_eq!(registry.count().await, 0);
        shutdown.trigger();
    }
}
