//! Caller-side coordination: dispatch a request, poll until it settles.

use std::{sync::Arc, time::Duration};

use feedback_collector_server::{
    domain::{FeedbackStatus, Language},
    infrastructure::dto::http::{FeedbackRecordDto, RequestFeedbackBody},
};
use tokio::time::Instant;

use crate::{
    content::{ContentItem, render_cancelled, render_completed, render_error},
    error::GatewayError,
    gateway::FeedbackGateway,
    i18n::catalog,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackResultKind {
    Completed,
    Cancelled,
    Error,
    TimedOut,
    /// The server could not be reached when dispatching
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackResult {
    pub request_id: String,
    pub kind: FeedbackResultKind,
    pub content: Vec<ContentItem>,
}

impl FeedbackResult {
    fn text(request_id: &str, kind: FeedbackResultKind, text: String) -> Self {
        Self {
            request_id: request_id.to_string(),
            kind,
            content: vec![ContentItem::Text(text)],
        }
    }
}

pub struct RequestCoordinator {
    gateway: Arc<dyn FeedbackGateway>,
    poll_interval: Duration,
    language: Language,
}

impl RequestCoordinator {
    pub fn new(gateway: Arc<dyn FeedbackGateway>) -> Self {
        Self {
            gateway,
            poll_interval: DEFAULT_POLL_INTERVAL,
            language: Language::default(),
        }
    }

    /// A zero interval keeps the default
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.poll_interval = interval;
        }
        self
    }

    /// Language of the request and of the coordinator's own messages
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Ask connected sessions for feedback and wait at most `timeout` for an answer
    pub async fn collect_feedback(&self, timeout: Duration) -> FeedbackResult {
        let texts = catalog(self.language);
        let request_id = uuid::Uuid::new_v4().to_string();
        let body = RequestFeedbackBody {
            id: Some(request_id.clone()),
            timeout: Some(timeout.as_secs().max(1)),
            language: Some(self.language),
        };

        tracing::info!("Collecting feedback, request id {}", request_id);
        if let Err(e) = self.gateway.request_feedback(&body).await {
            tracing::error!("Failed to dispatch feedback request {}: {}", request_id, e);
            return match e {
                GatewayError::Unreachable(reason) => FeedbackResult::text(
                    &request_id,
                    FeedbackResultKind::Unreachable,
                    texts.unreachable(&self.gateway.endpoint(), &reason),
                ),
                other => FeedbackResult::text(
                    &request_id,
                    FeedbackResultKind::Error,
                    texts.failed(&other.to_string()),
                ),
            };
        }

        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                tracing::info!("Feedback request {} timed out", request_id);
                return FeedbackResult::text(
                    &request_id,
                    FeedbackResultKind::TimedOut,
                    texts.timed_out.to_string(),
                );
            }

            // Never sleep past the deadline
            tokio::time::sleep(self.poll_interval.min(timeout - elapsed)).await;

            match self.gateway.fetch_feedback(&request_id).await {
                Ok(record) => {
                    if let Some(result) = self.settle(&request_id, record) {
                        self.release(&request_id).await;
                        return result;
                    }
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!("Polling {} failed, retrying: {}", request_id, e);
                }
                Err(e) => {
                    tracing::error!("Polling {} failed: {}", request_id, e);
                    return FeedbackResult::text(
                        &request_id,
                        FeedbackResultKind::Error,
                        texts.failed(&e.to_string()),
                    );
                }
            }
        }
    }

    /// `None` while the request is still waiting
    fn settle(&self, request_id: &str, record: FeedbackRecordDto) -> Option<FeedbackResult> {
        let (kind, content) = match record.status {
            FeedbackStatus::Waiting => return None,
            FeedbackStatus::Completed => (
                FeedbackResultKind::Completed,
                render_completed(record.data.as_ref()),
            ),
            FeedbackStatus::Cancelled => {
                let reason = record.data.as_ref().and_then(|data| data.reason.as_deref());
                tracing::info!("Feedback request {} cancelled: {:?}", request_id, reason);
                (
                    FeedbackResultKind::Cancelled,
                    render_cancelled(reason, self.language),
                )
            }
            FeedbackStatus::Error => (
                FeedbackResultKind::Error,
                render_error(record.message.as_deref(), self.language),
            ),
        };
        tracing::info!(
            "Feedback request {} settled as {} with {} item(s)",
            request_id,
            record.status,
            content.len()
        );
        Some(FeedbackResult {
            request_id: request_id.to_string(),
            kind,
            content,
        })
    }

    async fn release(&self, request_id: &str) {
        if let Err(e) = self.gateway.release_feedback(request_id).await {
            tracing::warn!("Failed to release feedback request {}: {}", request_id, e);
        }
    }
}
