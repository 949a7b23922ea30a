//! UseCase: フィードバック依頼の作成と配信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RequestFeedbackUseCase::execute() メソッド
//! - waiting エントリの作成と request_feedback のブロードキャスト
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続ありでの配信
//! - エッジケース：接続ゼロ（配信先 0 件でも成功扱い）、id 省略、空の id

use std::sync::Arc;

use feedback_collector_shared::time::now_rfc3339;

use crate::{
    domain::{FeedbackRepository, Language, MessagePusher, RequestId},
    infrastructure::dto::websocket::ServerMessage,
};

use super::error::RequestFeedbackError;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// Result of a dispatched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackReceipt {
    pub request_id: RequestId,
    /// Sessions the request was delivered to
    pub recipients: usize,
}

/// フィードバック依頼のユースケース
pub struct RequestFeedbackUseCase {
    repository: Arc<dyn FeedbackRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    default_language: Language,
}

impl RequestFeedbackUseCase {
    pub fn new(
        repository: Arc<dyn FeedbackRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        default_language: Language,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            default_language,
        }
    }

    /// フィードバック依頼を実行
    ///
    /// Omitted fields fall back to a fresh UUID, [`DEFAULT_TIMEOUT_SECONDS`]
    /// and the server's default language.
    pub async fn execute(
        &self,
        request_id: Option<String>,
        timeout_seconds: Option<u64>,
        language: Option<Language>,
    ) -> Result<FeedbackReceipt, RequestFeedbackError> {
        let request_id = match request_id {
            Some(raw) => RequestId::new(raw)?,
            None => RequestId::generate(),
        };
        let timeout = timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        let language = language.unwrap_or(self.default_language);

        // 1. Store に waiting として登録（ブロードキャストより先）
        self.repository
            .insert_waiting(request_id.clone(), timeout)
            .await;

        // 2. 全セッションへ配信
        let message = ServerMessage::RequestFeedback {
            id: request_id.as_str().to_string(),
            timestamp: now_rfc3339(),
            timeout,
            language,
        };
        let json = message
            .encode()
            .map_err(|e| RequestFeedbackError::Encode(e.to_string()))?;
        let recipients = self.message_pusher.broadcast(&json).await;

        tracing::info!(
            "Feedback request {} sent to {} connection(s) (timeout {}s, language {})",
            request_id,
            recipients,
            timeout,
            language
        );

        Ok(FeedbackReceipt {
            request_id,
            recipients,
        })
    }
}
