//! UseCase: フィードバック状態の取得

use std::sync::Arc;

use crate::domain::{FeedbackRepository, FeedbackRequest, RequestId};

pub struct GetFeedbackUseCase {
    repository: Arc<dyn FeedbackRepository>,
}

impl GetFeedbackUseCase {
    pub fn new(repository: Arc<dyn FeedbackRepository>) -> Self {
        Self { repository }
    }

    /// `None` means the store has no entry, which callers treat as waiting
    pub async fn execute(&self, request_id: &RequestId) -> Option<FeedbackRequest> {
        self.repository.get(request_id).await
    }
}
