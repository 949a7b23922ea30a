//! Domain errors.

use thiserror::Error;

use super::entity::FeedbackStatus;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("request id must not be empty")]
    EmptyRequestId,
}

/// Entity invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A request may transition to a terminal state only once
    #[error("request {request_id} is already {status}")]
    AlreadyTerminal {
        request_id: String,
        status: FeedbackStatus,
    },
}

/// Feedback store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("request {request_id} is already {status}")]
    AlreadyTerminal {
        request_id: String,
        status: FeedbackStatus,
    },
}

impl From<DomainError> for RepositoryError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::AlreadyTerminal { request_id, status } => {
                RepositoryError::AlreadyTerminal { request_id, status }
            }
        }
    }
}

/// Outbound message delivery errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
