//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{FeedbackStatus, Language};

use super::websocket::ImagePayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Body of `POST /api/request_feedback`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestFeedbackBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFeedbackResponse {
    pub status: ApiStatus,
    pub request_id: String,
    pub message: String,
    /// Sessions the request was delivered to
    pub recipients: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub status: ApiStatus,
    pub error: String,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            error: error.into(),
        }
    }
}

/// Stored state of a feedback request, as served by `GET /api/feedback/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecordDto {
    pub request_id: String,
    pub status: FeedbackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<FeedbackDataDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
}

impl FeedbackRecordDto {
    /// Placeholder for an id the store has never seen
    pub fn waiting(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: FeedbackStatus::Waiting,
            created_at: None,
            timeout: None,
            data: None,
            message: Some("waiting for feedback from the web interface".to_string()),
            resolved_at: None,
        }
    }
}

/// Payload of a terminal request: submission fields for `completed`,
/// `reason` for `cancelled`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDataDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImagePayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_append: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub connections: usize,
    pub config: HealthConfigDto,
}

/// Settings the server was started with, as reported by `/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfigDto {
    pub host: String,
    pub port: u16,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDto {
    pub connection_id: String,
    pub connected_at: String,
    pub last_heartbeat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<serde_json::Value>,
}
