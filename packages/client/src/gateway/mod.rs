//! Transport between the coordinator and the feedback server.

mod http;
mod in_process;

pub use http::HttpFeedbackGateway;
pub use in_process::InProcessFeedbackGateway;

use async_trait::async_trait;
use feedback_collector_server::infrastructure::dto::http::{
    FeedbackRecordDto, RequestFeedbackBody,
};

use crate::error::GatewayError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackGateway: Send + Sync {
    /// Create the request and fan it out; returns the request id the server used
    async fn request_feedback(&self, body: &RequestFeedbackBody) -> Result<String, GatewayError>;

    /// Current state of a request; unknown ids come back as `waiting`
    async fn fetch_feedback(&self, request_id: &str) -> Result<FeedbackRecordDto, GatewayError>;

    /// Drop the stored entry once its answer has been read
    async fn release_feedback(&self, request_id: &str) -> Result<(), GatewayError>;

    /// Where requests go, for log and error messages
    fn endpoint(&self) -> String;
}
