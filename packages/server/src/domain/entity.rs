//! Entities: connections and feedback requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    error::DomainError,
    value_object::{ConnectionId, Language, RequestId, Timestamp},
};

/// One accepted WebSocket session as seen by the registry
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
    pub last_heartbeat: Timestamp,
    /// Opaque metadata supplied by the client when connecting
    pub client_info: Option<serde_json::Value>,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        connected_at: Timestamp,
        client_info: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id,
            connected_at,
            last_heartbeat: connected_at,
            client_info,
        }
    }
}

/// An image attached to a submission, still base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    /// Base64 payload, possibly prefixed with a `data:<mime>;base64,` header
    pub data: String,
}

/// What the user sent back for a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub text: Option<String>,
    pub images: Vec<ImageAttachment>,
    pub auto_append: bool,
    pub language: Language,
    /// Client-side submission time, as sent by the client
    pub submitted_at: Option<String>,
}

/// Terminal result of a feedback request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Completed(FeedbackSubmission),
    Cancelled {
        reason: String,
        cancelled_at: Option<String>,
    },
    Error {
        message: String,
    },
}

impl FeedbackOutcome {
    pub fn status(&self) -> FeedbackStatus {
        match self {
            FeedbackOutcome::Completed(_) => FeedbackStatus::Completed,
            FeedbackOutcome::Cancelled { .. } => FeedbackStatus::Cancelled,
            FeedbackOutcome::Error { .. } => FeedbackStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Waiting,
    Completed,
    Cancelled,
    Error,
}

impl FeedbackStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FeedbackStatus::Waiting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Waiting => "waiting",
            FeedbackStatus::Completed => "completed",
            FeedbackStatus::Cancelled => "cancelled",
            FeedbackStatus::Error => "error",
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `collect_feedback` invocation as tracked by the store.
///
/// Starts `waiting` and moves to a terminal state at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub id: RequestId,
    pub created_at: Timestamp,
    /// `None` when the answer arrived before the request was registered
    pub timeout_seconds: Option<u64>,
    outcome: Option<FeedbackOutcome>,
    resolved_at: Option<Timestamp>,
}

impl FeedbackRequest {
    pub fn waiting(id: RequestId, timeout_seconds: u64, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            timeout_seconds: Some(timeout_seconds),
            outcome: None,
            resolved_at: None,
        }
    }

    /// A request first seen through its answer
    pub fn resolved(id: RequestId, outcome: FeedbackOutcome, at: Timestamp) -> Self {
        Self {
            id,
            created_at: at,
            timeout_seconds: None,
            outcome: Some(outcome),
            resolved_at: Some(at),
        }
    }

    pub fn status(&self) -> FeedbackStatus {
        self.outcome
            .as_ref()
            .map_or(FeedbackStatus::Waiting, FeedbackOutcome::status)
    }

    pub fn outcome(&self) -> Option<&FeedbackOutcome> {
        self.outcome.as_ref()
    }

    pub fn resolved_at(&self) -> Option<Timestamp> {
        self.resolved_at
    }

    /// Move to a terminal state; fails if already terminal.
    pub fn resolve(&mut self, outcome: FeedbackOutcome, at: Timestamp) -> Result<(), DomainError> {
        if let Some(current) = &self.outcome {
            return Err(DomainError::AlreadyTerminal {
                request_id: self.id.as_str().to_string(),
                status: current.status(),
            });
        }
        self.outcome = Some(outcome);
        self.resolved_at = Some(at);
        Ok(())
    }
}
