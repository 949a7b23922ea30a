//! UseCase: 受信メッセージのルーティング
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RouteMessageUseCase::route() / execute() メソッド
//! - heartbeat / feedback_submit / feedback_cancel の処理と返信内容
//!
//! ### なぜこのテストが必要か
//! - 最初の終端書き込みだけが採用されることを保証
//! - プロトコルエラーが送信元にだけ返されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信、キャンセル、ハートビート
//! - 異常系：request_id なし、重複送信、不正な JSON、未知の type、サーバー専用 type

use std::sync::Arc;

use feedback_collector_shared::time::{millis_to_rfc3339, now_millis};

use crate::{
    domain::{
        ConnectionId, ConnectionRegistry, FeedbackOutcome, FeedbackRepository,
        FeedbackSubmission, MessagePushError, MessagePusher, RequestId, Timestamp,
    },
    infrastructure::dto::websocket::{ClientMessage, ServerMessage, decode_client_message},
};

use super::error::RouteError;

const CANCEL_REASON: &str = "user cancelled";
const ACCEPTED: &str = "success";

/// 受信メッセージ処理のユースケース
pub struct RouteMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    repository: Arc<dyn FeedbackRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RouteMessageUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        repository: Arc<dyn FeedbackRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            repository,
            message_pusher,
        }
    }

    /// Handle one text frame and push the reply to the originating connection
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        text: &str,
    ) -> Result<(), MessagePushError> {
        let reply = self.route(connection_id, text).await;
        let json = reply
            .encode()
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        self.message_pusher.push_to(connection_id, &json).await
    }

    /// Apply the frame to the registry or store and build the reply
    pub async fn route(&self, connection_id: &ConnectionId, text: &str) -> ServerMessage {
        match self.dispatch(connection_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Rejected frame from {}: {}", connection_id, e);
                ServerMessage::error(e.to_string())
            }
        }
    }

    async fn dispatch(
        &self,
        connection_id: &ConnectionId,
        text: &str,
    ) -> Result<ServerMessage, RouteError> {
        match decode_client_message(text)? {
            ClientMessage::Heartbeat { .. } => {
                let now = now_millis();
                if !self
                    .registry
                    .touch(connection_id, Timestamp::new(now))
                    .await
                {
                    tracing::debug!("Heartbeat from unregistered connection {}", connection_id);
                }
                Ok(ServerMessage::HeartbeatResponse {
                    timestamp: millis_to_rfc3339(now),
                })
            }
            ClientMessage::FeedbackSubmit(mut payload) => {
                let request_id = required_request_id(payload.request_id.take())?;
                let submission = FeedbackSubmission::from(payload);
                tracing::info!(
                    "Feedback submitted for {} by {} ({} image(s))",
                    request_id,
                    connection_id,
                    submission.images.len()
                );
                self.repository
                    .resolve(request_id.clone(), FeedbackOutcome::Completed(submission))
                    .await?;
                Ok(ServerMessage::FeedbackReceived {
                    request_id: request_id.into_string(),
                    status: ACCEPTED.to_string(),
                })
            }
            ClientMessage::FeedbackCancel(payload) => {
                let request_id = required_request_id(payload.request_id)?;
                tracing::info!("Feedback cancelled for {} by {}", request_id, connection_id);
                self.repository
                    .resolve(
                        request_id.clone(),
                        FeedbackOutcome::Cancelled {
                            reason: CANCEL_REASON.to_string(),
                            cancelled_at: payload.timestamp,
                        },
                    )
                    .await?;
                Ok(ServerMessage::FeedbackCancelled {
                    request_id: request_id.into_string(),
                    status: ACCEPTED.to_string(),
                })
            }
        }
    }
}

fn required_request_id(raw: Option<String>) -> Result<RequestId, RouteError> {
    raw.and_then(|value| RequestId::new(value).ok())
        .ok_or(RouteError::MissingRequestId)
}
