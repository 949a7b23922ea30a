//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by its `type` field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Language;

/// Messages sent by the server to browser sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionEstablished {
        connection_id: String,
        timestamp: String,
        message: String,
    },
    HeartbeatRequest {
        timestamp: String,
    },
    RequestFeedback {
        id: String,
        timestamp: String,
        timeout: u64,
        language: Language,
    },
    HeartbeatResponse {
        timestamp: String,
    },
    FeedbackReceived {
        request_id: String,
        status: String,
    },
    FeedbackCancelled {
        request_id: String,
        status: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Messages sent by browser sessions to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Heartbeat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
    FeedbackSubmit(FeedbackSubmitPayload),
    FeedbackCancel(FeedbackCancelPayload),
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubmitPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImagePayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_append: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCancelPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Image entry of `feedback_submit.images`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Base64, optionally prefixed with `data:<mime>;base64,`
    #[serde(default)]
    pub data: String,
}

/// Why an inbound frame could not be turned into a [`ClientMessage`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InboundError {
    #[error("invalid format")]
    InvalidFormat,

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("{0} must be sent by the server, not by a client")]
    ServerOnly(String),
}

/// Decode a text frame received from a session.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, InboundError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| InboundError::InvalidFormat)?;
    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(InboundError::InvalidFormat)?
        .to_string();

    match kind.as_str() {
        "heartbeat" | "feedback_submit" | "feedback_cancel" => {
            serde_json::from_value(value).map_err(|_| InboundError::InvalidFormat)
        }
        "request_feedback" | "heartbeat_request" | "connection_established" => {
            Err(InboundError::ServerOnly(kind))
        }
        _ => Err(InboundError::UnknownType(kind)),
    }
}
