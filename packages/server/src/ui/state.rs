//! Shared application state.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetConnectionsUseCase, GetFeedbackUseCase,
        ReleaseFeedbackUseCase, RequestFeedbackUseCase, RouteMessageUseCase,
    },
};

/// Use cases shared by every handler
pub struct AppState {
    /// Settings reported by `/health`
    pub config: ServerConfig,
    /// ConnectClientUseCase（セッション接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（セッション切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// RouteMessageUseCase（受信メッセージ処理のユースケース）
    pub route_message_usecase: Arc<RouteMessageUseCase>,
    /// RequestFeedbackUseCase（フィードバック依頼のユースケース）
    pub request_feedback_usecase: Arc<RequestFeedbackUseCase>,
    /// GetFeedbackUseCase（フィードバック状態取得のユースケース）
    pub get_feedback_usecase: Arc<GetFeedbackUseCase>,
    /// ReleaseFeedbackUseCase（フィードバック解放のユースケース）
    pub release_feedback_usecase: Arc<ReleaseFeedbackUseCase>,
    /// GetConnectionsUseCase（接続一覧取得のユースケース）
    pub get_connections_usecase: Arc<GetConnectionsUseCase>,
}
