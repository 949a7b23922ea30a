use std::time::Duration;

use async_trait::async_trait;
use feedback_collector_server::infrastructure::dto::http::{
    ApiErrorResponse, ApiStatus, FeedbackRecordDto, RequestFeedbackBody, RequestFeedbackResponse,
};
use reqwest::{Client, Response, StatusCode};

use crate::error::GatewayError;

use super::FeedbackGateway;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Talks to the server's HTTP API
pub struct HttpFeedbackGateway {
    client: Client,
    base_url: String,
}

impl HttpFeedbackGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn feedback_url(&self, request_id: &str) -> String {
        format!("{}/api/feedback/{}", self.base_url, request_id)
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::Unreachable(err.to_string())
    }
}

/// Turn a non-2xx answer into `Rejected` when the body says why, `Status` otherwise
async fn status_error(response: Response) -> GatewayError {
    let status = response.status();
    match response.json::<ApiErrorResponse>().await {
        Ok(body) => GatewayError::Rejected(body.error),
        Err(_) => GatewayError::Status(status.as_u16()),
    }
}

#[async_trait]
impl FeedbackGateway for HttpFeedbackGateway {
    async fn request_feedback(&self, body: &RequestFeedbackBody) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}/api/request_feedback", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let answer: RequestFeedbackResponse = response.json().await.map_err(transport_error)?;
        if answer.status != ApiStatus::Success {
            return Err(GatewayError::Rejected(answer.message));
        }
        tracing::debug!(
            "Feedback request {} delivered to {} session(s)",
            answer.request_id,
            answer.recipients
        );
        Ok(answer.request_id)
    }

    async fn fetch_feedback(&self, request_id: &str) -> Result<FeedbackRecordDto, GatewayError> {
        let response = self
            .client
            .get(self.feedback_url(request_id))
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }
        response.json().await.map_err(transport_error)
    }

    async fn release_feedback(&self, request_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.feedback_url(request_id))
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(GatewayError::Rejected(format!(
                "feedback request '{}' not found",
                request_id
            ))),
            status => Err(GatewayError::Status(status.as_u16())),
        }
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}
