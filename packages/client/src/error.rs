//! Error types for the feedback collector client.

use thiserror::Error;

/// Failures talking to the feedback server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, request timeout
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// Non-2xx answer without a usable error body
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The server answered `{status: "error", error}`
    #[error("server rejected the request: {0}")]
    Rejected(String),

    /// The body could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether polling should simply try again later
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Unreachable(_) | GatewayError::Status(_))
    }
}

/// Image payload could not be turned into bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageDecodeError {
    #[error("data URL has no payload")]
    MissingPayload,

    #[error("invalid base64: {0}")]
    InvalidBase64(String),
}

impl From<base64::DecodeError> for ImageDecodeError {
    fn from(err: base64::DecodeError) -> Self {
        ImageDecodeError::InvalidBase64(err.to_string())
    }
}

/// Responder session errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An established session dropped
    #[error("Connection lost")]
    ConnectionLost,

    #[error("Failed to reconnect after {0} attempts")]
    ReconnectExhausted(u32),

    #[error("Failed to read image '{path}': {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
