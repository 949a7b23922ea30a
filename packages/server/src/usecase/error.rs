//! UseCase 層のエラー定義

use thiserror::Error;

use crate::{
    domain::{MessagePushError, RepositoryError, ValueObjectError},
    infrastructure::dto::websocket::InboundError,
};

/// Errors while setting up a new session
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to encode greeting: {0}")]
    Encode(String),

    #[error(transparent)]
    Greeting(#[from] MessagePushError),
}

/// Errors while creating and fanning out a feedback request
#[derive(Debug, Error)]
pub enum RequestFeedbackError {
    #[error("invalid request id: {0}")]
    InvalidRequestId(#[from] ValueObjectError),

    #[error("failed to encode feedback request: {0}")]
    Encode(String),
}

/// Protocol errors on an inbound frame; the display text is the reply sent
/// back to the originating session
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("missing request id")]
    MissingRequestId,

    #[error(transparent)]
    Inbound(#[from] InboundError),

    #[error(transparent)]
    Rejected(#[from] RepositoryError),
}

#[derive(Debug, Error)]
pub enum ReleaseFeedbackError {
    #[error("feedback request '{0}' not found")]
    NotFound(String),

    #[error("invalid request id: {0}")]
    InvalidRequestId(#[from] ValueObjectError),
}
