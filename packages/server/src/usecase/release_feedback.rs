//! UseCase: フィードバックエントリの解放

use std::sync::Arc;

use crate::domain::{FeedbackRepository, FeedbackRequest, RequestId};

use super::error::ReleaseFeedbackError;

pub struct ReleaseFeedbackUseCase {
    repository: Arc<dyn FeedbackRepository>,
}

impl ReleaseFeedbackUseCase {
    pub fn new(repository: Arc<dyn FeedbackRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, request_id: String) -> Result<FeedbackRequest, ReleaseFeedbackError> {
        let request_id = RequestId::new(request_id)?;
        match self.repository.remove(&request_id).await {
            Some(request) => {
                tracing::debug!("Released feedback request {}", request_id);
                Ok(request)
            }
            None => Err(ReleaseFeedbackError::NotFound(request_id.into_string())),
        }
    }
}
