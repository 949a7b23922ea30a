//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::RequestId,
    infrastructure::dto::http::{
        ApiErrorResponse, ApiStatus, ConnectionDto, FeedbackRecordDto, HealthConfigDto, HealthDto,
        RequestFeedbackBody, RequestFeedbackResponse,
    },
    ui::state::AppState,
    usecase::{ReleaseFeedbackError, RequestFeedbackError},
};

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ApiErrorResponse::new(error))).into_response()
}

/// `POST /api/request_feedback`
pub async fn request_feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RequestFeedbackBody>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!("Invalid feedback request body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state
        .request_feedback_usecase
        .execute(body.id, body.timeout, body.language)
        .await
    {
        Ok(receipt) => Json(RequestFeedbackResponse {
            status: ApiStatus::Success,
            request_id: receipt.request_id.into_string(),
            message: format!("feedback request sent to {} connection(s)", receipt.recipients),
            recipients: receipt.recipients,
        })
        .into_response(),
        Err(e @ RequestFeedbackError::InvalidRequestId(_)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            tracing::error!("Failed to dispatch feedback request: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `GET /api/feedback/{request_id}`
pub async fn get_feedback(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Json<FeedbackRecordDto> {
    let Ok(id) = RequestId::new(request_id.clone()) else {
        return Json(FeedbackRecordDto::waiting(request_id));
    };

    // Domain Model から DTO への変換
    match state.get_feedback_usecase.execute(&id).await {
        Some(request) => Json(FeedbackRecordDto::from(request)),
        None => Json(FeedbackRecordDto::waiting(id.into_string())),
    }
}

/// `DELETE /api/feedback/{request_id}`
pub async fn release_feedback(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> StatusCode {
    match state.release_feedback_usecase.execute(request_id).await {
        Ok(_) => StatusCode::NO_CONTENT,
        Err(ReleaseFeedbackError::NotFound(_) | ReleaseFeedbackError::InvalidRequestId(_)) => {
            StatusCode::NOT_FOUND
        }
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "healthy".to_string(),
        connections: state.get_connections_usecase.count().await,
        config: HealthConfigDto {
            host: state.config.host.clone(),
            port: state.config.port,
            language: state.config.default_language,
        },
    })
}

/// Debug endpoint listing live connections
pub async fn debug_connections(State(state): State<Arc<AppState>>) -> Json<Vec<ConnectionDto>> {
    let connections = state.get_connections_usecase.execute().await;
    Json(connections.into_iter().map(ConnectionDto::from).collect())
}
