use std::sync::Arc;

use async_trait::async_trait;
use feedback_collector_server::{
    domain::RequestId,
    infrastructure::dto::http::{FeedbackRecordDto, RequestFeedbackBody},
    ui::AppState,
    usecase::ReleaseFeedbackError,
};

use crate::error::GatewayError;

use super::FeedbackGateway;

/// Calls the server use cases directly, for a coordinator embedded in the
/// server process
pub struct InProcessFeedbackGateway {
    state: Arc<AppState>,
}

impl InProcessFeedbackGateway {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl FeedbackGateway for InProcessFeedbackGateway {
    async fn request_feedback(&self, body: &RequestFeedbackBody) -> Result<String, GatewayError> {
        let receipt = self
            .state
            .request_feedback_usecase
            .execute(body.id.clone(), body.timeout, body.language)
            .await
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;
        Ok(receipt.request_id.into_string())
    }

    async fn fetch_feedback(&self, request_id: &str) -> Result<FeedbackRecordDto, GatewayError> {
        let id = RequestId::new(request_id.to_string())
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;
        let record = match self.state.get_feedback_usecase.execute(&id).await {
            Some(request) => FeedbackRecordDto::from(request),
            None => FeedbackRecordDto::waiting(request_id),
        };
        Ok(record)
    }

    async fn release_feedback(&self, request_id: &str) -> Result<(), GatewayError> {
        match self
            .state
            .release_feedback_usecase
            .execute(request_id.to_string())
            .await
        {
            Ok(_) => Ok(()),
            Err(e @ ReleaseFeedbackError::NotFound(_))
            | Err(e @ ReleaseFeedbackError::InvalidRequestId(_)) => {
                Err(GatewayError::Rejected(e.to_string()))
            }
        }
    }

    fn endpoint(&self) -> String {
        "in-process".to_string()
    }
}
